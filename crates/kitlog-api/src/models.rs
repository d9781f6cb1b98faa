// Wire types for the inventory REST service
//
// Field names follow the service's JSON (camelCase, Mongo-style `_id`).
// These are transport shapes only; `kitlog-core` converts them into
// its domain model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inventory item as returned by `GET /items` and `POST /items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(with = "calendar_date")]
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub serial_number: String,
}

/// Body of `POST /items`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub category: String,
    #[serde(with = "calendar_date")]
    pub purchase_date: NaiveDate,
    pub serial_number: String,
}

/// A maintenance record as returned by `GET /maintenance` and `POST /maintenance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceResponse {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    /// Not every deployment echoes the owning item back.
    #[serde(default)]
    pub item_id: Option<String>,
    pub service_type: String,
    #[serde(with = "calendar_date")]
    pub date_of_service: NaiveDate,
    pub cost: f64,
}

/// Body of `POST /maintenance`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaintenance {
    pub item_id: String,
    pub service_type: String,
    #[serde(with = "calendar_date")]
    pub date_of_service: NaiveDate,
    pub cost: f64,
}

/// Calendar dates go out as `YYYY-MM-DD`. On the way in, full RFC 3339
/// timestamps are accepted too since the service stores instants.
pub(crate) mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid calendar date '{raw}'")))
    }

    pub(crate) fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }
}
