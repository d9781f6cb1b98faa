//! Client-side state synchronization between `kitlog-api` and front-ends.
//!
//! This crate owns the session, selection, and refresh-after-write logic
//! that keeps a local view of the inventory consistent with the remote
//! authority:
//!
//! - **[`SessionGuard`]**: Holds the bearer credential. Every operation
//!   that needs one asks the guard first and short-circuits with
//!   [`CoreError::Unauthorized`] when it is absent, without touching the
//!   network.
//!
//! - **[`Selection`]**: Tracks the single item whose maintenance history
//!   is open. A generation counter bumps on every change so late responses
//!   for an abandoned selection can be recognised and dropped.
//!
//! - **[`Inventory`]**: The synchronization loop: validate, call the
//!   resource client, re-fetch the affected collection, then replace the
//!   view wholesale. Failures leave the previous view untouched and set a
//!   single error message.
//!
//! - **[`ViewState`] / [`ViewStream`]**: The published view, held in a
//!   `tokio::sync::watch` channel. Front-ends take snapshots or subscribe.
//!
//! - **Domain model** ([`model`]) and **forms** ([`form`]): typed items
//!   and maintenance records, plus raw form input that validates into
//!   drafts before any I/O happens.

pub mod config;
pub mod convert;
pub mod error;
pub mod form;
pub mod inventory;
pub mod model;
pub mod selection;
pub mod session;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_SERVICE_URL, ServiceConfig, TlsVerification};
pub use error::CoreError;
pub use form::{AccountForm, ItemDraft, ItemForm, MaintenanceDraft, MaintenanceForm};
pub use inventory::Inventory;
pub use selection::{Selection, SelectionTicket};
pub use session::SessionGuard;
pub use stream::ViewStream;
pub use view::ViewState;

pub use kitlog_api::SessionToken;

// Re-export model types at the crate root for ergonomics.
pub use model::{Category, Item, ItemId, MaintenanceRecord};
