//! Command dispatch: bridges CLI args -> inventory operations -> output formatting.

pub mod auth;
pub mod browse;
pub mod config_cmd;
pub mod items;
pub mod maintenance;
pub mod util;

use kitlog_core::Inventory;

use crate::cli::{Command, GlobalOpts};
use crate::config::ProfileContext;
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    inventory: &Inventory,
    ctx: &mut ProfileContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(inventory, ctx, args, global).await,
        Command::Register(args) => auth::register(inventory, ctx, args, global).await,
        Command::Logout => auth::logout(inventory, ctx, global),
        Command::Items(args) => items::handle(inventory, args, global).await,
        Command::Maintenance(args) => maintenance::handle(inventory, args, global).await,
        Command::Browse => browse::handle(inventory, ctx, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
