// ── Session guard ──
//
// The one place a bearer token lives. Passed explicitly to whatever
// needs it; cheap to clone, every clone sees the same session.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::info;

use kitlog_api::SessionToken;

use crate::error::CoreError;

/// Holds the current session token, if any.
///
/// The guard never refreshes or expires a token on its own. A token is
/// set by a successful login (or a register response carrying one) or by
/// restoring a persisted token, and cleared by logout or by a 401 from
/// the authority.
#[derive(Clone, Default)]
pub struct SessionGuard {
    token: Arc<ArcSwapOption<SessionToken>>,
}

impl SessionGuard {
    /// A guard with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard already holding `token` (e.g. restored from the keyring).
    pub fn with_token(token: SessionToken) -> Self {
        let guard = Self::new();
        guard.establish(token);
        guard
    }

    /// The current token, if one is held.
    pub fn token(&self) -> Option<Arc<SessionToken>> {
        self.token.load_full()
    }

    /// The current token, or [`CoreError::Unauthorized`].
    pub fn require(&self) -> Result<Arc<SessionToken>, CoreError> {
        self.token().ok_or(CoreError::Unauthorized)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.load().is_some()
    }

    /// Replace the held token.
    pub fn establish(&self, token: SessionToken) {
        self.token.store(Some(Arc::new(token)));
        info!("session established");
    }

    /// Drop the held token. Returns whether one was held.
    pub fn clear(&self) -> bool {
        let previous = self.token.swap(None);
        if previous.is_some() {
            info!("session cleared");
        }
        previous.is_some()
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_guard_refuses() {
        let guard = SessionGuard::new();
        assert!(guard.token().is_none());
        assert_eq!(guard.require().err(), Some(CoreError::Unauthorized));
    }

    #[test]
    fn clones_share_the_session() {
        let guard = SessionGuard::new();
        let other = guard.clone();

        guard.establish(SessionToken::new("t1"));
        assert_eq!(
            other.require().map(|t| t.expose_secret().to_owned()),
            Ok("t1".to_owned())
        );

        assert!(other.clear());
        assert!(!guard.is_authenticated());
        assert!(!guard.clear());
    }

    #[test]
    fn debug_does_not_leak_token() {
        let guard = SessionGuard::with_token(SessionToken::new("secret"));
        let rendered = format!("{guard:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("authenticated: true"));
    }
}
