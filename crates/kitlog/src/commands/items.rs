//! Item command handlers.

use tabled::Tabled;

use kitlog_core::{Inventory, Item, ItemForm, ItemId};

use crate::cli::{GlobalOpts, ItemsArgs, ItemsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Purchased")]
    purchased: String,
    #[tabled(rename = "Serial")]
    serial: String,
}

impl From<&Item> for ItemRow {
    fn from(i: &Item) -> Self {
        Self {
            id: i.id.to_string(),
            name: i.name.clone(),
            category: i.category.clone(),
            purchased: i.purchase_date.to_string(),
            serial: i.serial_number.clone(),
        }
    }
}

fn detail(i: &Item) -> String {
    [
        format!("ID:        {}", i.id),
        format!("Name:      {}", i.name),
        format!("Category:  {}", i.category),
        format!("Purchased: {}", i.purchase_date),
        format!("Serial:    {}", i.serial_number),
    ]
    .join("\n")
}

/// Render the current item listing.
pub(super) fn render(inventory: &Inventory, global: &GlobalOpts) -> String {
    let snap = inventory.items_snapshot();
    output::render_list(
        &global.output,
        snap.as_slice(),
        |i| ItemRow::from(i),
        |i| i.id.to_string(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    inventory: &Inventory,
    args: ItemsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ItemsCommand::List => {
            inventory.refresh_items().await?;
            output::print_output(&render(inventory, global), global.quiet);
            Ok(())
        }

        ItemsCommand::Add {
            name,
            category,
            purchase_date,
            serial,
        } => {
            let form = ItemForm {
                name,
                category,
                purchase_date,
                serial_number: serial,
            };
            let item = inventory.add_item(&form).await?;
            let out = output::render_single(&global.output, &item, detail, |i| i.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ItemsCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete item '{id}' and its maintenance history?"),
                "items delete",
                global.yes,
            )? {
                return Ok(());
            }
            inventory.delete_item(&ItemId::from(id.as_str())).await?;
            output::success(&format!("Item '{id}' deleted"), &global.color, global.quiet);
            Ok(())
        }
    }
}
