// Resource client for the inventory REST service
//
// Wraps `reqwest::Client` with URL construction, bearer-token
// attachment, and status/error normalization. Endpoint families
// (items, maintenance, auth) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::SessionToken;
use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape from the service ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Operation ────────────────────────────────────────────────────────

/// The request/response pairs this client issues.
///
/// Carried on errors so callers can tell which call failed, and used to
/// pick a fallback message when the service sends none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListItems,
    CreateItem,
    DeleteItem,
    ListMaintenance,
    CreateMaintenance,
    Login,
    Register,
}

impl Operation {
    /// Message used when a rejection carries no server-supplied text.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::ListItems => "Failed to fetch items",
            Self::CreateItem => "Failed to add item",
            Self::DeleteItem => "Failed to delete item",
            Self::ListMaintenance => "Failed to fetch maintenance history",
            Self::CreateMaintenance => "Failed to add maintenance record",
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ListItems => "list items",
            Self::CreateItem => "create item",
            Self::DeleteItem => "delete item",
            Self::ListMaintenance => "list maintenance",
            Self::CreateMaintenance => "create maintenance",
            Self::Login => "login",
            Self::Register => "register",
        };
        f.write_str(name)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the inventory service.
///
/// Stateless with respect to authentication: every resource call takes
/// the [`SessionToken`] explicitly and sends it as a bearer credential.
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl InventoryClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the service rooted at `base_url`.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages timeouts and TLS).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// Force a trailing slash so relative joins keep any path prefix
    /// (e.g. `https://host/api` + `items` -> `https://host/api/items`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The service base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join a relative path (e.g. `"items"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// `{base}/{collection}/{id}` with `id` percent-encoded as a single segment.
    pub(crate) fn member_url(&self, collection: &str, id: &str) -> Result<Url, Error> {
        let mut url = self.url(collection)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach the bearer credential.
    fn authorized(
        builder: reqwest::RequestBuilder,
        token: &SessionToken,
    ) -> reqwest::RequestBuilder {
        builder.bearer_auth(token.expose_secret())
    }

    /// Send a request, folding reqwest's timeout flavour into [`Error::Timeout`].
    pub(crate) async fn send(
        &self,
        operation: Operation,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                debug!(%operation, "request timed out");
                Error::Timeout {
                    timeout: self.timeout,
                }
            } else {
                Error::Transport(e)
            }
        })
    }

    /// Authenticated GET returning the raw JSON body.
    ///
    /// List endpoints decode leniently, so the shape check is left to
    /// the caller.
    pub(crate) async fn get_value(
        &self,
        operation: Operation,
        url: Url,
        token: &SessionToken,
    ) -> Result<serde_json::Value, Error> {
        debug!("GET {url}");
        let resp = self
            .send(operation, Self::authorized(self.http.get(url), token))
            .await?;
        Self::handle_response(operation, resp).await
    }

    /// Authenticated POST with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        operation: Operation,
        url: Url,
        token: &SessionToken,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        let resp = self
            .send(
                operation,
                Self::authorized(self.http.post(url).json(body), token),
            )
            .await?;
        Self::handle_response(operation, resp).await
    }

    /// Authenticated DELETE; the response body is ignored.
    pub(crate) async fn delete(
        &self,
        operation: Operation,
        url: Url,
        token: &SessionToken,
    ) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self
            .send(operation, Self::authorized(self.http.delete(url), token))
            .await?;
        Self::handle_empty(operation, resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Decode a JSON array leniently. Elements that do not decode as `T`
    /// are skipped; anything that is not an array yields an empty list.
    pub(crate) fn decode_list<T: DeserializeOwned>(
        operation: Operation,
        value: Option<serde_json::Value>,
    ) -> Vec<T> {
        match value {
            Some(serde_json::Value::Array(entries)) => entries
                .into_iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    serde_json::from_value(entry)
                        .map_err(|e| {
                            warn!(
                                %operation,
                                index,
                                error = %e,
                                "skipping list element that did not decode"
                            );
                        })
                        .ok()
                })
                .collect(),
            Some(other) => {
                warn!(%operation, kind = json_kind(&other), "expected a list, treating as empty");
                Vec::new()
            }
            None => {
                warn!(%operation, "list missing from response, treating as empty");
                Vec::new()
            }
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        operation: Operation,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: body.clone(),
                }
            })
        } else {
            Err(Self::parse_error(operation, status, resp).await)
        }
    }

    async fn handle_empty(operation: Operation, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(operation, status, resp).await)
        }
    }

    /// Turn a non-success response into an error, preferring the
    /// service's `message` field over the operation fallback.
    async fn parse_error(
        operation: Operation,
        status: reqwest::StatusCode,
        resp: reqwest::Response,
    ) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| operation.fallback_message().to_owned());

        debug!(%operation, status = status.as_u16(), %message, "request rejected");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            Error::SessionExpired { operation, message }
        } else {
            Error::Rejected {
                operation,
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
