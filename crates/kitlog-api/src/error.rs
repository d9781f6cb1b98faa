use thiserror::Error;

use crate::client::Operation;

/// Top-level error type for the `kitlog-api` crate.
///
/// Covers every failure mode of the REST surface: the auth exchange,
/// transport, rejected requests, and undecodable bodies.
/// `kitlog-core` maps these into user-facing messages.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login or registration was refused by the authority.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The bearer token was rejected (HTTP 401) on a resource endpoint.
    #[error("Session expired: {message}")]
    SessionExpired { operation: Operation, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: std::time::Duration },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authority ───────────────────────────────────────────────────
    /// Non-success status from a resource endpoint. `message` is the
    /// server-supplied text when present, else the operation fallback.
    #[error("{message}")]
    Rejected {
        operation: Operation,
        status: u16,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the authority no longer accepts the session token.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Returns `true` if no response was obtained at all.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. } | Self::Tls(_))
    }

    /// Returns `true` if this is a "not found" rejection.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Rejected { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// HTTP status of a rejected request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::SessionExpired { .. } => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
