//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use kitlog_config::ConfigError;
use kitlog_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot reach the inventory service")]
    #[diagnostic(
        code(kitlog::connection_failed),
        help(
            "{reason}\n\
             Check the service URL with: kitlog config show\n\
             Or override it with --url"
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(
        code(kitlog::not_logged_in),
        help("Run: kitlog login --profile {profile}\nOr set KITLOG_TOKEN.")
    )]
    NotLoggedIn { profile: String },

    #[error("{message}")]
    #[diagnostic(
        code(kitlog::session_expired),
        help("The stored session is no longer valid. Run: kitlog login")
    )]
    SessionExpired { message: String },

    #[error("{message}")]
    #[diagnostic(code(kitlog::auth_failed), help("Check your email and password."))]
    AuthFailed { message: String },

    // ── Service ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(kitlog::not_found),
        help("Run: kitlog items list to see current items")
    )]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(kitlog::rejected))]
    Rejected { status: u16, message: String },

    #[error("{message}")]
    #[diagnostic(code(kitlog::malformed_response))]
    MalformedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(kitlog::validation))]
    Validation { field: String, reason: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(kitlog::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(kitlog::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: kitlog config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(kitlog::config),
        help("Inspect the file with: kitlog config show")
    )]
    Config(#[from] ConfigError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotLoggedIn { .. } | Self::SessionExpired { .. } | Self::AuthFailed { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized => CliError::NotLoggedIn {
                profile: "default".into(),
            },

            CoreError::SessionExpired { message } => CliError::SessionExpired { message },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Validation { field, message } => CliError::Validation {
                field: field.into(),
                reason: message,
            },

            CoreError::RequestRejected {
                status: 404,
                message,
            } => CliError::NotFound { message },

            CoreError::RequestRejected { status, message } => {
                CliError::Rejected { status, message }
            }

            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl CliError {
    /// Attach the profile name to a missing-session error.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::NotLoggedIn { .. } => Self::NotLoggedIn {
                profile: profile.to_owned(),
            },
            other => other,
        }
    }
}
