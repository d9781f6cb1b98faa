//! Maintenance history command handlers.

use tabled::Tabled;

use kitlog_core::{Inventory, ItemId, MaintenanceForm, MaintenanceRecord};

use crate::cli::{GlobalOpts, MaintenanceArgs, MaintenanceCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

impl From<&MaintenanceRecord> for RecordRow {
    fn from(r: &MaintenanceRecord) -> Self {
        Self {
            date: r.date_of_service.to_string(),
            service: r.service_type.clone(),
            cost: format!("{:.2}", r.cost),
        }
    }
}

fn plain_line(r: &MaintenanceRecord) -> String {
    format!("{}\t{}\t{:.2}", r.date_of_service, r.service_type, r.cost)
}

fn detail(r: &MaintenanceRecord) -> String {
    [
        format!("Date:    {}", r.date_of_service),
        format!("Service: {}", r.service_type),
        format!("Cost:    {:.2}", r.cost),
    ]
    .join("\n")
}

/// Render the open item's history, oldest first.
pub(super) fn render(inventory: &Inventory, global: &GlobalOpts) -> String {
    let snap = inventory.maintenance_snapshot();
    output::render_list(&global.output, snap.as_slice(), |r| RecordRow::from(r), plain_line)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    inventory: &Inventory,
    args: MaintenanceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MaintenanceCommand::List { item_id } => {
            inventory.view_maintenance(ItemId::from(item_id)).await?;
            output::print_output(&render(inventory, global), global.quiet);
            Ok(())
        }

        MaintenanceCommand::Add {
            item_id,
            service_type,
            date,
            cost,
        } => {
            // Records attach to the open item, so open it first.
            inventory.view_maintenance(ItemId::from(item_id)).await?;
            let form = MaintenanceForm {
                service_type,
                date_of_service: date,
                cost,
            };
            let record = inventory.add_maintenance(&form).await?;
            let out = output::render_single(&global.output, &record, detail, plain_line);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
