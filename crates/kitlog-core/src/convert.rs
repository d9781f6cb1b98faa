// ── API-to-domain type conversions ──
//
// Bridges `kitlog_api` wire shapes and `kitlog_core::model` domain types
// in both directions: responses become domain values, validated drafts
// become request bodies.

use kitlog_api::{ItemResponse, MaintenanceResponse, NewItem, NewMaintenance};

use crate::form::{ItemDraft, MaintenanceDraft};
use crate::model::{Item, ItemId, MaintenanceRecord};

// ── Responses ───────────────────────────────────────────────────────

impl From<ItemResponse> for Item {
    fn from(raw: ItemResponse) -> Self {
        Self {
            id: ItemId::from(raw.id),
            name: raw.name,
            category: raw.category,
            purchase_date: raw.purchase_date,
            serial_number: raw.serial_number,
        }
    }
}

impl From<MaintenanceResponse> for MaintenanceRecord {
    fn from(raw: MaintenanceResponse) -> Self {
        Self {
            id: raw.id,
            item_id: raw.item_id.map(ItemId::from),
            service_type: raw.service_type,
            date_of_service: raw.date_of_service,
            cost: raw.cost,
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

impl From<&ItemDraft> for NewItem {
    fn from(draft: &ItemDraft) -> Self {
        Self {
            name: draft.name.clone(),
            category: draft.category.to_string(),
            purchase_date: draft.purchase_date,
            serial_number: draft.serial_number.clone(),
        }
    }
}

/// Attach the owning item to a maintenance draft.
pub(crate) fn new_maintenance(item_id: &ItemId, draft: &MaintenanceDraft) -> NewMaintenance {
    NewMaintenance {
        item_id: item_id.as_str().to_owned(),
        service_type: draft.service_type.clone(),
        date_of_service: draft.date_of_service,
        cost: draft.cost,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::model::Category;

    #[test]
    fn draft_category_goes_out_as_display_name() {
        let draft = ItemDraft {
            name: "Shelf".into(),
            category: Category::Furniture,
            purchase_date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            serial_number: "S-9".into(),
        };
        let body = NewItem::from(&draft);
        assert_eq!(body.category, "Furniture");
        assert_eq!(body.serial_number, "S-9");
    }

    #[test]
    fn maintenance_body_carries_selected_item() {
        let draft = MaintenanceDraft {
            service_type: "Oil".into(),
            date_of_service: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            cost: 10.0,
        };
        let body = new_maintenance(&ItemId::from("i1"), &draft);
        assert_eq!(body.item_id, "i1");
        assert_eq!(body.service_type, "Oil");
    }
}
