mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kitlog_core::Inventory;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't talk to the service
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "kitlog", &mut std::io::stdout());
            Ok(())
        }

        // Everything else runs against the service
        cmd => {
            let mut ctx = config::ProfileContext::load(&cli.global);
            let service = config::resolve_service_config(&ctx.profile(), &ctx.config, &cli.global)?;
            let session = ctx.session(&cli.global);
            let inventory = Inventory::new(&service, session)?;

            tracing::debug!(command = ?cmd, url = %service.url, "dispatching command");
            let result = commands::dispatch(cmd, &inventory, &mut ctx, &cli.global).await;

            if let Err(e) = ctx.sync_session(&inventory) {
                tracing::warn!(error = %e, "could not forget the rejected session token");
            }
            result.map_err(|e| e.for_profile(&ctx.name))
        }
    }
}
