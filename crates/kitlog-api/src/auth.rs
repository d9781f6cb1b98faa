// Authentication exchange
//
// `POST /auth/login` trades email + password for a bearer token;
// `POST /auth/register` creates an account and may hand one back.
// The token itself is never stored here; callers own the session.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::{InventoryClient, Operation};
use crate::error::Error;

/// Bearer credential issued by the authority.
///
/// Wraps a [`SecretString`] so the token never shows up in `Debug`
/// output or logs.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    /// The raw token, for the `Authorization` header and for persistence.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(****)")
    }
}

impl From<SecretString> for SessionToken {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

/// Account details submitted to `POST /auth/register`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct AuthErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

impl InventoryClient {
    /// Exchange credentials for a session token.
    ///
    /// `POST /auth/login` with `{"email": ..., "password": ...}`; the
    /// response must carry a `token` field.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SessionToken, Error> {
        let url = self.url("auth/login")?;
        debug!("logging in at {}", url);

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let resp = self.send(Operation::Login, self.http().post(url).json(&body)).await?;
        let token = Self::read_token(Operation::Login, resp).await?;

        token
            .map(SessionToken::new)
            .ok_or_else(|| Error::Authentication {
                message: "login response did not include a token".into(),
            })
    }

    /// Create an account.
    ///
    /// `POST /auth/register` with `{"name", "email", "password"}`. Some
    /// deployments log the new user in straight away and return a token;
    /// that token is handed back when present.
    pub async fn register(&self, account: &NewAccount) -> Result<Option<SessionToken>, Error> {
        let url = self.url("auth/register")?;
        debug!(email = %account.email, "registering account");

        let body = json!({
            "name": account.name,
            "email": account.email,
            "password": account.password.expose_secret(),
        });
        let resp = self
            .send(Operation::Register, self.http().post(url).json(&body))
            .await?;
        let token = Self::read_token(Operation::Register, resp).await?;

        debug!(issued_token = token.is_some(), "registration complete");
        Ok(token.map(SessionToken::new))
    }

    /// Decode `{ "token": ... }` from an auth response, turning any
    /// non-success status into [`Error::Authentication`].
    async fn read_token(
        operation: Operation,
        resp: reqwest::Response,
    ) -> Result<Option<String>, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("{} (HTTP {status})", operation.fallback_message()));
            return Err(Error::Authentication { message });
        }

        // Registration may legitimately answer with an empty body.
        if body.trim().is_empty() {
            return Ok(None);
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        Ok(parsed.token)
    }
}
