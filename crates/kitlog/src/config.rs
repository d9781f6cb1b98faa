//! CLI configuration: thin wrapper around `kitlog_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--url,
//! --token, --timeout, --insecure) and tracks where the session token
//! came from so a dead stored token can be forgotten.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use kitlog_core::{
    DEFAULT_SERVICE_URL, Inventory, ServiceConfig, SessionGuard, SessionToken, TlsVerification,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use kitlog_config::{
    Config, Profile, TokenStorage, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Translate a `Profile` + global flags into a `ServiceConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_service_config(
    profile: &Profile,
    config: &Config,
    global: &GlobalOpts,
) -> Result<ServiceConfig, CliError> {
    // 1. Service URL (flag > env > profile > built-in)
    let url_str = global
        .url
        .as_deref()
        .or(profile.url.as_deref())
        .unwrap_or(DEFAULT_SERVICE_URL);
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 3. Timeout (flag > profile > defaults)
    let timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(config.defaults.timeout),
    );

    Ok(ServiceConfig { url, timeout, tls })
}

// ── Profile context ─────────────────────────────────────────────────

/// Where the session token for this run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `--token` / `KITLOG_TOKEN`.
    Flag,
    /// Keyring, profile env var, or plaintext config.
    Stored,
    /// No token; requests short-circuit as unauthorized.
    Absent,
}

/// The loaded config plus the profile this invocation works against.
pub struct ProfileContext {
    pub config: Config,
    pub name: String,
    token_source: TokenSource,
}

impl ProfileContext {
    pub fn load(global: &GlobalOpts) -> Self {
        let config = load_config_or_default();
        let name = active_profile_name(global, &config);
        Self {
            config,
            name,
            token_source: TokenSource::Absent,
        }
    }

    /// The active profile, or an empty one if it is not configured yet.
    pub fn profile(&self) -> Profile {
        self.config.profiles.get(&self.name).cloned().unwrap_or_default()
    }

    /// Build the session guard: flag token first, then the stored one.
    pub fn session(&mut self, global: &GlobalOpts) -> SessionGuard {
        if let Some(ref raw) = global.token {
            self.token_source = TokenSource::Flag;
            return SessionGuard::with_token(SessionToken::new(raw.clone()));
        }

        match kitlog_config::resolve_token(&self.profile(), &self.name) {
            Some(secret) => {
                debug!(profile = %self.name, "using stored session token");
                self.token_source = TokenSource::Stored;
                SessionGuard::with_token(SessionToken::new(secret.expose_secret()))
            }
            None => {
                self.token_source = TokenSource::Absent;
                SessionGuard::new()
            }
        }
    }

    pub fn token_source(&self) -> TokenSource {
        self.token_source
    }

    /// Persist the session the inventory now holds, remembering the email
    /// as the next login prompt default.
    pub fn remember_session(
        &mut self,
        inventory: &Inventory,
        email: &str,
    ) -> Result<Option<TokenStorage>, CliError> {
        let Some(token) = inventory.session().token() else {
            return Ok(None);
        };
        let secret = SecretString::from(token.expose_secret().to_owned());
        let storage = kitlog_config::store_token(&mut self.config, &self.name, &secret);
        if let Some(profile) = self.config.profiles.get_mut(&self.name) {
            profile.email = Some(email.to_owned());
        }
        save_config(&self.config)?;
        self.token_source = TokenSource::Stored;
        Ok(Some(storage))
    }

    /// Drop the persisted token for this profile.
    pub fn forget_session(&mut self) -> Result<(), CliError> {
        if kitlog_config::clear_token(&mut self.config, &self.name) {
            save_config(&self.config)?;
        }
        self.token_source = TokenSource::Absent;
        Ok(())
    }

    /// Forget the stored token once the service has rejected it.
    pub fn sync_session(&mut self, inventory: &Inventory) -> Result<(), CliError> {
        if self.token_source == TokenSource::Stored && !inventory.session().is_authenticated() {
            debug!(profile = %self.name, "stored session rejected, forgetting it");
            self.forget_session()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["kitlog"];
        argv.extend_from_slice(args);
        argv.push("logout");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_profile() {
        let profile = Profile {
            url: Some("https://inventory.internal".into()),
            timeout: Some(5),
            ..Profile::default()
        };
        let cfg = Config::default();
        let opts = global(&["--url", "http://localhost:4000", "--timeout", "9", "-k"]);

        let service = resolve_service_config(&profile, &cfg, &opts).unwrap();
        assert_eq!(service.url.as_str(), "http://localhost:4000/");
        assert_eq!(service.timeout, Duration::from_secs(9));
        assert!(matches!(service.tls, TlsVerification::DangerAcceptInvalid));
    }

    #[test]
    fn profile_then_defaults() {
        let profile = Profile {
            url: Some("https://inventory.internal".into()),
            ..Profile::default()
        };
        let cfg = Config::default();
        let opts = global(&[]);

        let service = resolve_service_config(&profile, &cfg, &opts).unwrap();
        assert_eq!(service.url.as_str(), "https://inventory.internal/");
        assert_eq!(service.timeout, Duration::from_secs(cfg.defaults.timeout));
        assert!(matches!(service.tls, TlsVerification::SystemDefaults));
    }

    #[test]
    fn invalid_url_flag_is_a_usage_error() {
        let opts = global(&["--url", "not a url"]);
        let err =
            resolve_service_config(&Profile::default(), &Config::default(), &opts).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "url"));
    }
}
