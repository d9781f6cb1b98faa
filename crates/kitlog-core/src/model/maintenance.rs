// ── Maintenance record domain type ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::item::ItemId;

/// One entry in an item's service history. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    /// Authority-assigned id, when the service reports one.
    pub id: Option<String>,
    /// Owning item, when the service echoes it back.
    pub item_id: Option<ItemId>,
    pub service_type: String,
    pub date_of_service: NaiveDate,
    /// Non-negative.
    pub cost: f64,
}

/// Order records by date of service. Stable, so records sharing a date
/// keep the authority's order.
pub(crate) fn sort_chronologically(records: &mut [MaintenanceRecord]) {
    records.sort_by_key(|r| r.date_of_service);
}
