// ── Published view state ──
//
// Everything a front-end renders, replaced wholesale on each committed
// fetch. Collections sit behind `Arc` so snapshots are cheap to clone.

use std::sync::Arc;

use serde::Serialize;

use crate::model::{Item, ItemId, MaintenanceRecord};
use crate::selection::Selection;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewState {
    /// Items from the latest successful listing, in authority order.
    pub items: Arc<Vec<Item>>,
    /// Service history of the selected item, oldest first.
    pub maintenance: Arc<Vec<MaintenanceRecord>>,
    pub selection: Selection,
    /// Last failure, shown until the next fully successful operation.
    pub error: Option<String>,
}

impl ViewState {
    /// Look up an item in the current listing.
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// The item whose maintenance history is open, if it is still listed.
    pub fn selected_item(&self) -> Option<&Item> {
        self.selection.active().and_then(|id| self.item(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn selected_item_resolves_against_listing() {
        let mut view = ViewState {
            items: Arc::new(vec![Item {
                id: ItemId::from("i1"),
                name: "Drill".into(),
                category: "Electronics".into(),
                purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                serial_number: "SN1".into(),
            }]),
            ..ViewState::default()
        };
        assert!(view.selected_item().is_none());

        view.selection.select(ItemId::from("i1"));
        assert_eq!(view.selected_item().map(|i| i.name.as_str()), Some("Drill"));

        view.selection.select(ItemId::from("gone"));
        assert!(view.selected_item().is_none());
    }
}
