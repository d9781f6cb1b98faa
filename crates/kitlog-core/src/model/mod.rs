// ── Domain model ──

pub mod item;
pub mod maintenance;

pub use item::{Category, Item, ItemId};
pub use maintenance::MaintenanceRecord;
