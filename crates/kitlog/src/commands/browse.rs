//! Interactive session over one inventory.
//!
//! Failures never end the session: they land in the view's error slot
//! and are shown above the next menu, the same way a form would show
//! them.

use std::io::{self, IsTerminal};

use dialoguer::Select;
use strum::IntoEnumIterator;
use tracing::debug;

use kitlog_core::{Category, CoreError, Inventory, ItemForm, MaintenanceForm};

use crate::cli::GlobalOpts;
use crate::config::ProfileContext;
use crate::error::CliError;
use crate::output;

use super::{items, maintenance, util};

// ── Menus ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    OpenItem,
    AddItem,
    DeleteItem,
    Refresh,
    Logout,
    Login,
    Quit,
}

impl MainAction {
    fn label(self) -> &'static str {
        match self {
            Self::OpenItem => "Open an item's maintenance history",
            Self::AddItem => "Add an item",
            Self::DeleteItem => "Delete an item",
            Self::Refresh => "Refresh",
            Self::Logout => "Log out",
            Self::Login => "Log in",
            Self::Quit => "Quit",
        }
    }

    fn available(authenticated: bool) -> &'static [Self] {
        if authenticated {
            &[
                Self::OpenItem,
                Self::AddItem,
                Self::DeleteItem,
                Self::Refresh,
                Self::Logout,
                Self::Quit,
            ]
        } else {
            &[Self::Login, Self::Quit]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryAction {
    AddRecord,
    Refresh,
    Close,
}

impl HistoryAction {
    const ALL: [Self; 3] = [Self::AddRecord, Self::Refresh, Self::Close];

    fn label(self) -> &'static str {
        match self {
            Self::AddRecord => "Add a maintenance record",
            Self::Refresh => "Refresh",
            Self::Close => "Close",
        }
    }
}

fn choose<T: Copy>(
    prompt: &str,
    actions: &[T],
    label: impl Fn(T) -> &'static str,
) -> Result<T, CliError> {
    let labels: Vec<&str> = actions.iter().map(|a| label(*a)).collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;
    actions
        .get(idx)
        .copied()
        .ok_or_else(|| util::prompt_err("selection out of range"))
}

/// Failures are already recorded in the view; just note them in the log.
fn settle<T>(result: Result<T, CoreError>) {
    if let Err(e) = result {
        debug!(error = %e, "action failed");
    }
}

/// The form to pre-fill next time: kept after a failed cycle, dropped
/// after a successful one.
fn retain_on_failure<F, T>(form: F, result: &Result<T, CoreError>) -> Option<F> {
    result.is_err().then_some(form)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    inventory: &Inventory,
    ctx: &mut ProfileContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "browse".into(),
            reason: "an interactive terminal is required".into(),
        });
    }

    if inventory.session().is_authenticated() {
        settle(inventory.refresh_items().await);
    }

    let mut pending_item: Option<ItemForm> = None;
    loop {
        show_items(inventory, global);

        let authenticated = inventory.session().is_authenticated();
        let action = choose(
            "What next?",
            MainAction::available(authenticated),
            MainAction::label,
        )?;

        match action {
            MainAction::OpenItem => {
                if let Some(idx) = pick_item(inventory, "Open which item?")? {
                    history(inventory, idx, global).await?;
                }
            }
            MainAction::AddItem => {
                let form = prompt_item(pending_item.take().unwrap_or_default())?;
                let result = inventory.add_item(&form).await;
                pending_item = retain_on_failure(form, &result);
                settle(result);
            }
            MainAction::DeleteItem => {
                let picked = pick_item(inventory, "Delete which item?")?
                    .and_then(|idx| inventory.items_snapshot().get(idx).map(|i| i.id.clone()));
                if let Some(id) = picked {
                    if util::confirm(
                        &format!("Delete item '{id}' and its maintenance history?"),
                        "items delete",
                        global.yes,
                    )? {
                        settle(inventory.delete_item(&id).await);
                    }
                }
            }
            MainAction::Refresh => settle(inventory.refresh_items().await),
            MainAction::Logout => {
                inventory.logout();
                ctx.forget_session()?;
            }
            MainAction::Login => login(inventory, ctx).await?,
            MainAction::Quit => return Ok(()),
        }

        ctx.sync_session(inventory)?;
    }
}

// ── Screens ─────────────────────────────────────────────────────────

fn show_items(inventory: &Inventory, global: &GlobalOpts) {
    println!();
    if inventory.items_snapshot().is_empty() {
        println!("No items.");
    } else {
        println!("{}", items::render(inventory, global));
    }
    show_error(inventory, global);
}

fn show_error(inventory: &Inventory, global: &GlobalOpts) {
    if let Some(message) = inventory.error_message() {
        output::error_line(&message, &global.color);
    }
}

async fn history(inventory: &Inventory, idx: usize, global: &GlobalOpts) -> Result<(), CliError> {
    let Some(item) = inventory.items_snapshot().get(idx).cloned() else {
        return Ok(());
    };
    settle(inventory.view_maintenance(item.id.clone()).await);

    let mut pending_record: Option<MaintenanceForm> = None;
    loop {
        println!();
        println!("Maintenance history for {} ({})", item.name, item.id);
        if inventory.maintenance_snapshot().is_empty() {
            println!("No maintenance recorded.");
        } else {
            println!("{}", maintenance::render(inventory, global));
        }
        show_error(inventory, global);

        if !inventory.session().is_authenticated() {
            break;
        }

        match choose("What next?", &HistoryAction::ALL, HistoryAction::label)? {
            HistoryAction::AddRecord => {
                let form = prompt_record(pending_record.take().unwrap_or_default())?;
                let result = inventory.add_maintenance(&form).await;
                pending_record = retain_on_failure(form, &result);
                settle(result);
            }
            HistoryAction::Refresh => settle(inventory.refresh_maintenance().await),
            HistoryAction::Close => break,
        }
    }

    inventory.close_maintenance();
    Ok(())
}

async fn login(inventory: &Inventory, ctx: &mut ProfileContext) -> Result<(), CliError> {
    let email = util::prompt_text("Email", ctx.profile().email)?;
    let password = util::read_password(false)?;
    if inventory.login(&email, &password).await.is_ok() {
        ctx.remember_session(inventory, &email)?;
        settle(inventory.refresh_items().await);
    }
    Ok(())
}

// ── Prompts ─────────────────────────────────────────────────────────

fn pick_item(inventory: &Inventory, prompt: &str) -> Result<Option<usize>, CliError> {
    let snap = inventory.items_snapshot();
    if snap.is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = snap
        .iter()
        .map(|i| format!("{} [{}] {}", i.name, i.category, i.serial_number))
        .collect();
    Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(util::prompt_err)
}

fn prompt_item(prior: ItemForm) -> Result<ItemForm, CliError> {
    let name = util::prompt_prefilled("Name", &prior.name)?;
    let categories: Vec<String> = Category::iter().map(|c| c.to_string()).collect();
    let category = Select::new()
        .with_prompt("Category")
        .items(&categories)
        .default(category_index(&categories, &prior.category))
        .interact()
        .map_err(util::prompt_err)?;
    let purchase_date =
        util::prompt_prefilled("Purchase date (YYYY-MM-DD)", &prior.purchase_date)?;
    let serial_number = util::prompt_prefilled("Serial number", &prior.serial_number)?;

    Ok(ItemForm {
        name,
        category: categories.get(category).cloned().unwrap_or_default(),
        purchase_date,
        serial_number,
    })
}

fn category_index(categories: &[String], chosen: &str) -> usize {
    categories.iter().position(|c| c == chosen).unwrap_or(0)
}

fn prompt_record(prior: MaintenanceForm) -> Result<MaintenanceForm, CliError> {
    Ok(MaintenanceForm {
        service_type: util::prompt_prefilled("Service type", &prior.service_type)?,
        date_of_service: util::prompt_prefilled(
            "Date of service (YYYY-MM-DD)",
            &prior.date_of_service,
        )?,
        cost: util::prompt_prefilled("Cost", &prior.cost)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rejected_record() -> MaintenanceForm {
        MaintenanceForm {
            service_type: "Oil change".into(),
            date_of_service: "2024-03-01".into(),
            cost: "abc".into(),
        }
    }

    #[test]
    fn failed_cycle_keeps_form_for_next_prompt() {
        let result: Result<(), CoreError> = rejected_record().validate().map(|_| ());
        assert!(result.is_err());

        let kept = retain_on_failure(rejected_record(), &result).unwrap();
        assert_eq!(kept.service_type, "Oil change");
        assert_eq!(kept.date_of_service, "2024-03-01");
        assert_eq!(kept.cost, "abc");
    }

    #[test]
    fn successful_cycle_clears_form() {
        let result: Result<(), CoreError> = Ok(());
        assert!(retain_on_failure(rejected_record(), &result).is_none());
        assert!(retain_on_failure(ItemForm::default(), &result).is_none());
    }

    #[test]
    fn prior_category_is_preselected() {
        let categories: Vec<String> = Category::iter().map(|c| c.to_string()).collect();
        let last = categories.last().unwrap().clone();
        assert_eq!(category_index(&categories, &last), categories.len() - 1);
        assert_eq!(category_index(&categories, ""), 0);
        assert_eq!(category_index(&categories, "Boats"), 0);
    }

    #[test]
    fn signed_out_menu_only_offers_login() {
        assert_eq!(
            MainAction::available(false),
            &[MainAction::Login, MainAction::Quit]
        );
        assert!(MainAction::available(true).contains(&MainAction::OpenItem));
        assert!(!MainAction::available(true).contains(&MainAction::Login));
    }
}
