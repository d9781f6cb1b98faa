// ── Synchronization loop ──
//
// Every user action runs one cycle: validate locally, call the resource
// client, re-fetch the affected collection, then replace the view
// wholesale. A failure anywhere sets the single error message and
// leaves the rest of the view as it was.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use kitlog_api::transport::{TlsMode, TransportConfig};
use kitlog_api::{InventoryClient, NewItem, SessionToken};

use crate::config::{ServiceConfig, TlsVerification};
use crate::convert::new_maintenance;
use crate::error::CoreError;
use crate::form::{AccountForm, ItemForm, MaintenanceForm, validate_login};
use crate::model::maintenance::sort_chronologically;
use crate::model::{Item, ItemId, MaintenanceRecord};
use crate::selection::{Selection, SelectionTicket};
use crate::session::SessionGuard;
use crate::stream::ViewStream;
use crate::view::ViewState;

/// The main entry point for front-ends.
///
/// Cheaply cloneable via `Arc<InventoryInner>`. Owns the resource client
/// and the published view; the session is shared with whoever passed
/// the [`SessionGuard`] in.
#[derive(Clone)]
pub struct Inventory {
    inner: Arc<InventoryInner>,
}

struct InventoryInner {
    client: InventoryClient,
    session: SessionGuard,
    view: watch::Sender<ViewState>,
}

impl Inventory {
    /// Build a client for `config` and start with an empty view.
    pub fn new(config: &ServiceConfig, session: SessionGuard) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = InventoryClient::new(config.url.as_str(), &transport).map_err(|e| {
            CoreError::Config {
                message: e.to_string(),
            }
        })?;
        Ok(Self::with_client(client, session))
    }

    /// Wrap an already-built resource client.
    pub fn with_client(client: InventoryClient, session: SessionGuard) -> Self {
        let (view, _) = watch::channel(ViewState::default());
        Self {
            inner: Arc::new(InventoryInner {
                client,
                session,
                view,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The session this inventory authenticates with.
    pub fn session(&self) -> &SessionGuard {
        &self.inner.session
    }

    pub fn service_url(&self) -> &Url {
        self.inner.client.base_url()
    }

    /// Snapshot of the whole view.
    pub fn view(&self) -> ViewState {
        self.inner.view.borrow().clone()
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> ViewStream {
        ViewStream::new(self.inner.view.subscribe())
    }

    pub fn items_snapshot(&self) -> Arc<Vec<Item>> {
        Arc::clone(&self.inner.view.borrow().items)
    }

    pub fn maintenance_snapshot(&self) -> Arc<Vec<MaintenanceRecord>> {
        Arc::clone(&self.inner.view.borrow().maintenance)
    }

    pub fn selection(&self) -> Selection {
        self.inner.view.borrow().selection.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner.view.borrow().error.clone()
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Exchange credentials for a session token and hold it.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), CoreError> {
        let outcome = async {
            let email = validate_login(email, password)?;
            Ok::<_, CoreError>(self.inner.client.login(&email, password).await?)
        }
        .await;

        match outcome {
            Ok(token) => {
                self.inner.session.establish(token);
                self.clear_error();
                info!("logged in");
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Create an account. Returns whether the authority also started a
    /// session (some deployments answer registration with a token).
    pub async fn register(&self, form: &AccountForm) -> Result<bool, CoreError> {
        let outcome = async {
            let account = form.validate()?;
            Ok::<_, CoreError>(self.inner.client.register(&account).await?)
        }
        .await;

        match outcome {
            Ok(token) => {
                let signed_in = token.is_some();
                if let Some(token) = token {
                    self.inner.session.establish(token);
                }
                self.clear_error();
                info!(signed_in, "registered account");
                Ok(signed_in)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Forget the session and everything fetched under it.
    pub fn logout(&self) {
        self.inner.session.clear();
        // Item listings fetched under the old token no longer commit, and
        // closing the selection makes pending history fetches stale.
        self.inner.view.send_modify(|view| {
            view.selection.close();
            view.items = Arc::new(Vec::new());
            view.maintenance = Arc::new(Vec::new());
            view.error = None;
        });
        info!("logged out");
    }

    // ── Items ────────────────────────────────────────────────────────

    /// Re-fetch the item listing.
    pub async fn refresh_items(&self) -> Result<(), CoreError> {
        let outcome = async {
            let token = self.inner.session.require()?;
            let items = self.fetch_items(&token).await?;
            Ok::<_, CoreError>((token, items))
        }
        .await;

        match outcome {
            Ok((token, items)) => {
                self.commit_items(&token, items);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Validate and create an item, then re-fetch the listing.
    pub async fn add_item(&self, form: &ItemForm) -> Result<Item, CoreError> {
        let outcome = async {
            let draft = form.validate()?;
            let token = self.inner.session.require()?;
            let created = self
                .inner
                .client
                .create_item(&token, &NewItem::from(&draft))
                .await?;
            debug!(id = %created.id, "item created");
            let items = self.fetch_items(&token).await?;
            Ok::<_, CoreError>((Item::from(created), token, items))
        }
        .await;

        match outcome {
            Ok((created, token, items)) => {
                self.commit_items(&token, items);
                Ok(created)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Delete an item, then re-fetch the listing. The selection is left
    /// alone even if it pointed at the deleted item.
    pub async fn delete_item(&self, id: &ItemId) -> Result<(), CoreError> {
        let outcome = async {
            let token = self.inner.session.require()?;
            self.inner.client.delete_item(&token, id.as_str()).await?;
            debug!(%id, "item deleted");
            let items = self.fetch_items(&token).await?;
            Ok::<_, CoreError>((token, items))
        }
        .await;

        match outcome {
            Ok((token, items)) => {
                self.commit_items(&token, items);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // ── Maintenance ──────────────────────────────────────────────────

    /// Select `id`, open its maintenance sub-view, and load its history.
    ///
    /// Any previously shown history is cleared straight away. If the
    /// selection changes again before the fetch resolves, the result is
    /// dropped.
    pub async fn view_maintenance(&self, id: ItemId) -> Result<(), CoreError> {
        let mut ticket = None;
        self.inner.view.send_modify(|view| {
            ticket = Some(view.selection.select(id));
            view.maintenance = Arc::new(Vec::new());
        });
        match ticket {
            Some(ticket) => self.load_maintenance(ticket).await,
            None => Ok(()),
        }
    }

    /// Close the maintenance sub-view. In-flight fetches become stale.
    pub fn close_maintenance(&self) {
        self.inner.view.send_modify(|view| {
            view.selection.close();
            view.maintenance = Arc::new(Vec::new());
        });
    }

    /// Re-fetch the history of the selected item.
    pub async fn refresh_maintenance(&self) -> Result<(), CoreError> {
        match self.require_selection() {
            Ok(ticket) => self.load_maintenance(ticket).await,
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Validate and append a record to the selected item's history, then
    /// re-fetch that history.
    pub async fn add_maintenance(
        &self,
        form: &MaintenanceForm,
    ) -> Result<MaintenanceRecord, CoreError> {
        let outcome = async {
            let draft = form.validate()?;
            let ticket = self.require_selection()?;
            let token = self.inner.session.require()?;
            let body = new_maintenance(&ticket.item_id, &draft);
            let created = self.inner.client.create_maintenance(&token, &body).await?;
            debug!(item_id = %ticket.item_id, "maintenance record created");
            Ok::<_, CoreError>((MaintenanceRecord::from(created), ticket))
        }
        .await;

        match outcome {
            Ok((created, ticket)) => {
                self.load_maintenance(ticket).await?;
                Ok(created)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // ── Cycle plumbing ───────────────────────────────────────────────

    async fn fetch_items(&self, token: &SessionToken) -> Result<Vec<Item>, CoreError> {
        let raw = self.inner.client.list_items(token).await?;
        debug!(count = raw.len(), "fetched items");
        Ok(raw.into_iter().map(Item::from).collect())
    }

    async fn fetch_maintenance(
        &self,
        item_id: &ItemId,
    ) -> Result<Vec<MaintenanceRecord>, CoreError> {
        let token = self.inner.session.require()?;
        let raw = self
            .inner
            .client
            .list_maintenance(&token, item_id.as_str())
            .await?;
        let mut records: Vec<MaintenanceRecord> =
            raw.into_iter().map(MaintenanceRecord::from).collect();
        sort_chronologically(&mut records);
        debug!(%item_id, count = records.len(), "fetched maintenance records");
        Ok(records)
    }

    /// Fetch under `ticket` and commit only if it is still current.
    ///
    /// The currency check and the write happen inside one `watch`
    /// modification, so nothing can slip in between them.
    async fn load_maintenance(&self, ticket: SelectionTicket) -> Result<(), CoreError> {
        match self.fetch_maintenance(&ticket.item_id).await {
            Ok(records) => {
                let committed = self.inner.view.send_if_modified(|view| {
                    if !view.selection.is_current(&ticket) {
                        return false;
                    }
                    view.maintenance = Arc::new(records);
                    view.error = None;
                    true
                });
                if !committed {
                    debug!(
                        item_id = %ticket.item_id,
                        generation = ticket.generation,
                        "selection moved on, discarding maintenance records"
                    );
                }
                Ok(())
            }
            Err(e) => {
                self.expire_session_on(&e);
                let message = e.to_string();
                let recorded = self.inner.view.send_if_modified(|view| {
                    if !view.selection.is_current(&ticket) {
                        return false;
                    }
                    view.error = Some(message);
                    true
                });
                if !recorded {
                    debug!(item_id = %ticket.item_id, error = %e, "stale maintenance fetch failed");
                }
                Err(e)
            }
        }
    }

    fn require_selection(&self) -> Result<SelectionTicket, CoreError> {
        self.inner
            .view
            .borrow()
            .selection
            .ticket()
            .ok_or_else(|| CoreError::Validation {
                field: "selection",
                message: "Select an item to manage its maintenance history".into(),
            })
    }

    /// Commit a listing fetched under `token`, unless the session has
    /// since been cleared or replaced.
    fn commit_items(&self, token: &Arc<SessionToken>, items: Vec<Item>) {
        let session = &self.inner.session;
        let committed = self.inner.view.send_if_modified(|view| {
            let current = session
                .token()
                .is_some_and(|held| Arc::ptr_eq(&held, token));
            if !current {
                return false;
            }
            view.items = Arc::new(items);
            view.error = None;
            true
        });
        if !committed {
            debug!("session changed, discarding item listing");
        }
    }

    fn clear_error(&self) {
        self.inner.view.send_if_modified(|view| view.error.take().is_some());
    }

    /// Record `err` as the visible message and hand it back.
    fn fail(&self, err: CoreError) -> CoreError {
        self.expire_session_on(&err);
        debug!(error = %err, "operation failed");
        let message = err.to_string();
        self.inner.view.send_modify(|view| view.error = Some(message));
        err
    }

    /// A 401 from the authority ends the session.
    fn expire_session_on(&self, err: &CoreError) {
        if matches!(err, CoreError::SessionExpired { .. }) && self.inner.session.clear() {
            warn!("authority rejected the session token, logged out");
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &ServiceConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
