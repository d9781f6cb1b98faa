// ── Runtime service configuration ──
//
// Describes *where* the authority lives and how to talk to it. Never
// touches disk: kitlog-config (or a test) builds a `ServiceConfig` and
// hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// The public deployment of the inventory service.
pub const DEFAULT_SERVICE_URL: &str = "https://inventory-backend-2z0a.onrender.com";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-hosted authority with a self-signed cert).
    DangerAcceptInvalid,
}

/// Configuration for one inventory service endpoint.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Service base URL (e.g., `https://inventory.example.com`).
    pub url: Url,
    /// Upper bound on a single request.
    pub timeout: Duration,
    /// TLS verification strategy.
    pub tls: TlsVerification,
}

impl ServiceConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_SERVICE_URL).expect("default service URL is valid"),
            timeout: Duration::from_secs(30),
            tls: TlsVerification::default(),
        }
    }
}
