// kitlog-api: Async Rust client for the inventory and maintenance REST service

pub mod auth;
pub mod client;
pub mod error;
pub mod items;
pub mod maintenance;
pub mod models;
pub mod transport;

pub use auth::{NewAccount, SessionToken};
pub use client::{InventoryClient, Operation};
pub use error::Error;
pub use models::{ItemResponse, MaintenanceResponse, NewItem, NewMaintenance};
pub use transport::{TlsMode, TransportConfig};
