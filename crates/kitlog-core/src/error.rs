// ── Core error types ──
//
// User-facing errors from kitlog-core. Front-ends show `to_string()`
// verbatim, so every variant renders as a finished sentence or as the
// authority's own message. The `From<kitlog_api::Error>` impl folds
// transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Clone` so the last failure can live in the published view state
/// while also being returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// No session token is held; the request was never sent.
    #[error("Unauthorized access. Please log in again.")]
    Unauthorized,

    /// The authority rejected the token (HTTP 401). The session has been
    /// torn down by the time callers see this.
    #[error("{message}")]
    SessionExpired { message: String },

    /// Login or registration was refused.
    #[error("{message}")]
    AuthenticationFailed { message: String },

    // ── Input errors ─────────────────────────────────────────────────
    /// Locally detected malformed input. Nothing was sent.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    // ── Authority errors ─────────────────────────────────────────────
    /// Non-success status; `message` is the server's text or the
    /// operation fallback.
    #[error("{message}")]
    RequestRejected { status: u16, message: String },

    /// No response was obtained (network, DNS, TLS, or timeout).
    #[error("Cannot reach the inventory service: {reason}")]
    ConnectionFailed { reason: String },

    /// A single entity was expected but the body did not decode.
    #[error("Unexpected response from the inventory service: {message}")]
    MalformedResponse { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` for failures that need the user to log in (again).
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::SessionExpired { .. } | Self::AuthenticationFailed { .. }
        )
    }

    /// Returns `true` if the authority answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RequestRejected { status: 404, .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<kitlog_api::Error> for CoreError {
    fn from(err: kitlog_api::Error) -> Self {
        match err {
            kitlog_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            kitlog_api::Error::SessionExpired { message, .. } => {
                CoreError::SessionExpired { message }
            }
            kitlog_api::Error::Transport(ref e) => match e.status() {
                Some(status) => CoreError::RequestRejected {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => CoreError::ConnectionFailed {
                    reason: e.to_string(),
                },
            },
            kitlog_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            kitlog_api::Error::Timeout { timeout } => CoreError::ConnectionFailed {
                reason: format!("request timed out after {timeout:?}"),
            },
            kitlog_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            kitlog_api::Error::Rejected {
                status, message, ..
            } => CoreError::RequestRejected { status, message },
            kitlog_api::Error::Deserialization { message, .. } => {
                CoreError::MalformedResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitlog_api::Operation;

    #[test]
    fn rejection_keeps_server_message_verbatim() {
        let err = CoreError::from(kitlog_api::Error::Rejected {
            operation: Operation::DeleteItem,
            status: 404,
            message: "not found".into(),
        });
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn session_expiry_is_an_auth_error() {
        let err = CoreError::from(kitlog_api::Error::SessionExpired {
            operation: Operation::ListItems,
            message: "jwt expired".into(),
        });
        assert!(err.is_auth());
        assert_eq!(err, CoreError::SessionExpired { message: "jwt expired".into() });
    }

    #[test]
    fn timeout_is_a_connection_failure() {
        let err = CoreError::from(kitlog_api::Error::Timeout {
            timeout: std::time::Duration::from_millis(300),
        });
        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
        assert_eq!(
            err.to_string(),
            "Cannot reach the inventory service: request timed out after 300ms"
        );
    }

    #[test]
    fn unauthorized_message() {
        assert_eq!(
            CoreError::Unauthorized.to_string(),
            "Unauthorized access. Please log in again."
        );
    }
}
