// ── Form input and validation ──
//
// Front-ends collect raw strings into these forms. `validate()` turns a
// form into a typed draft or a `CoreError::Validation`; the
// synchronization loop refuses to call the authority with anything else.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};

use kitlog_api::NewAccount;

use crate::error::CoreError;
use crate::model::Category;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Item ────────────────────────────────────────────────────────────

/// Raw input for a new item.
#[derive(Debug, Clone, Default)]
pub struct ItemForm {
    pub name: String,
    pub category: String,
    pub purchase_date: String,
    pub serial_number: String,
}

/// A validated item, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub category: Category,
    pub purchase_date: NaiveDate,
    pub serial_number: String,
}

impl ItemForm {
    pub fn validate(&self) -> Result<ItemDraft, CoreError> {
        let name = required("name", "Name", &self.name)?;
        let category = required("category", "Category", &self.category)?
            .parse::<Category>()
            .map_err(|_| {
                CoreError::validation(
                    "category",
                    "Category must be one of Furniture, Electronics or Books",
                )
            })?;
        let purchase_date = calendar_date("purchase_date", "Purchase date", &self.purchase_date)?;
        let serial_number = required("serial_number", "Serial number", &self.serial_number)?;

        Ok(ItemDraft {
            name,
            category,
            purchase_date,
            serial_number,
        })
    }
}

// ── Maintenance ─────────────────────────────────────────────────────

/// Raw input for a new maintenance record.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceForm {
    pub service_type: String,
    pub date_of_service: String,
    pub cost: String,
}

/// A validated maintenance record. The owning item comes from the
/// current selection, not from the form.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceDraft {
    pub service_type: String,
    pub date_of_service: NaiveDate,
    pub cost: f64,
}

impl MaintenanceForm {
    pub fn validate(&self) -> Result<MaintenanceDraft, CoreError> {
        let service_type = required("service_type", "Service type", &self.service_type)?;
        let date_of_service =
            calendar_date("date_of_service", "Date of service", &self.date_of_service)?;
        let cost = self
            .cost
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite() && *c >= 0.0)
            .ok_or_else(|| CoreError::validation("cost", "Cost must be a non-negative number"))?;

        Ok(MaintenanceDraft {
            service_type,
            date_of_service,
            cost,
        })
    }
}

// ── Account ─────────────────────────────────────────────────────────

/// Raw input for `register`.
#[derive(Debug, Clone)]
pub struct AccountForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl AccountForm {
    pub fn validate(&self) -> Result<NewAccount, CoreError> {
        let name = required("name", "Name", &self.name)?;
        let email = required("email", "Email", &self.email)?;
        check_password(&self.password)?;
        Ok(NewAccount {
            name,
            email,
            password: self.password.clone(),
        })
    }
}

/// Login input only has to be present.
pub(crate) fn validate_login(email: &str, password: &SecretString) -> Result<String, CoreError> {
    let email = required("email", "Email", email)?;
    check_password(password)?;
    Ok(email)
}

// ── Helpers ─────────────────────────────────────────────────────────

fn check_password(password: &SecretString) -> Result<(), CoreError> {
    if password.expose_secret().is_empty() {
        return Err(CoreError::validation("password", "Password is required"));
    }
    Ok(())
}

fn required(field: &'static str, label: &str, raw: &str) -> Result<String, CoreError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CoreError::validation(field, format!("{label} is required")));
    }
    Ok(value.to_owned())
}

fn calendar_date(field: &'static str, label: &str, raw: &str) -> Result<NaiveDate, CoreError> {
    let value = required(field, label, raw)?;
    NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|_| {
        CoreError::validation(field, format!("{label} must be a date like 2024-01-31"))
    })
}
