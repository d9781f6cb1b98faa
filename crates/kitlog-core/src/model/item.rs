// ── Item domain types ──
//
// Items are owned by the authority. The client only ever holds the copy
// from the latest fetch and never edits one in place.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── ItemId ──────────────────────────────────────────────────────────

/// Opaque item identifier assigned by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── Category ────────────────────────────────────────────────────────

/// The categories the client lets a user pick when adding an item.
///
/// The authority stores category as free text, so fetched items may
/// carry values outside this set; see [`Item::known_category`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Furniture,
    Electronics,
    Books,
}

// ── Item ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Free text as stored by the authority.
    pub category: String,
    pub purchase_date: NaiveDate,
    /// Not guaranteed unique.
    pub serial_number: String,
}

impl Item {
    /// The category, if it is one the client offers.
    pub fn known_category(&self) -> Option<Category> {
        self.category.parse().ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("electronics".parse::<Category>().unwrap(), Category::Electronics);
        assert!("Tools".parse::<Category>().is_err());
    }

    #[test]
    fn category_set_is_fixed() {
        let names: Vec<String> = Category::iter().map(|c| c.to_string()).collect();
        assert_eq!(names, ["Furniture", "Electronics", "Books"]);
    }

    #[test]
    fn item_id_is_transparent_on_the_wire() {
        let id = ItemId::from("65a1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"65a1\"");
        assert_eq!(id.to_string(), "65a1");
    }

    #[test]
    fn unknown_category_is_kept_but_not_known() {
        let item = Item {
            id: ItemId::from("i1"),
            name: "Lamp".into(),
            category: "Lighting".into(),
            purchase_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            serial_number: String::new(),
        };
        assert_eq!(item.known_category(), None);
    }
}
