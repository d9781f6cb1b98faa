//! Login, registration and logout.

use kitlog_core::{AccountForm, Inventory};

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::config::{self, ProfileContext, TokenSource, TokenStorage};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn login(
    inventory: &Inventory,
    ctx: &mut ProfileContext,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let email = util::value_or_prompt(args.email, "Email", ctx.profile().email)?;
    let password = util::read_password(args.password_stdin)?;

    inventory.login(&email, &password).await?;
    let storage = ctx.remember_session(inventory, &email)?;

    output::success(
        &format!("Logged in as {email}{}", storage_note(storage)),
        &global.color,
        global.quiet,
    );
    Ok(())
}

pub async fn register(
    inventory: &Inventory,
    ctx: &mut ProfileContext,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let name = util::value_or_prompt(args.name, "Name", None)?;
    let email = util::value_or_prompt(args.email, "Email", None)?;
    let password = util::read_password(args.password_stdin)?;

    let form = AccountForm {
        name,
        email,
        password,
    };
    let signed_in = inventory.register(&form).await?;

    if signed_in {
        let storage = ctx.remember_session(inventory, form.email.trim())?;
        output::success(
            &format!("Account created, logged in{}", storage_note(storage)),
            &global.color,
            global.quiet,
        );
    } else {
        output::success(
            "Account created. Run: kitlog login",
            &global.color,
            global.quiet,
        );
    }
    Ok(())
}

pub fn logout(
    inventory: &Inventory,
    ctx: &mut ProfileContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let source = ctx.token_source();
    inventory.logout();
    ctx.forget_session()?;

    let message = if source == TokenSource::Flag {
        "Logged out (the token passed with --token was never stored)"
    } else {
        "Logged out"
    };
    output::success(message, &global.color, global.quiet);
    Ok(())
}

fn storage_note(storage: Option<TokenStorage>) -> String {
    match storage {
        Some(TokenStorage::Keyring) => " (token saved to the system keyring)".into(),
        Some(TokenStorage::ConfigFile) => {
            format!(" (token saved to {})", config::config_path().display())
        }
        None => String::new(),
    }
}
