//! Config entry lifecycle
//!
//! Setting up an entry wires its token store, client, throttled poller,
//! calendar and services into an [`EntryContext`]. Contexts live in the
//! integration's registry keyed by entry id; nothing is global.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crewconnect_domain::constants::{DOMAIN, SERVICE_FIND_UNSTAFFED_FLIGHTS};
use crewconnect_domain::{ConfigEntry, CrewConnectError, EntryData, PollingConfig, Result};
use parking_lot::RwLock;
use tracing::{error, info, instrument};

use crate::auth_flow::{AuthorizationFlow, FlowResult};
use crate::calendar::FlightCalendar;
use crate::client::ports::{ClientAuth, ClientConnector};
use crate::entries::ports::EntryStorage;
use crate::flights::UnstaffedFlightsService;
use crate::polling::PolledClient;
use crate::services::{validate_unstaffed_flights, FindUnstaffedFlightsHandler, ServiceRegistry};
use crate::tokens::TokenStore;

/// Everything owned by one set-up config entry
pub struct EntryContext {
    entry: ConfigEntry,
    tokens: Arc<TokenStore>,
    client: Arc<PolledClient>,
}

impl std::fmt::Debug for EntryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryContext")
            .field("entry_id", &self.entry.entry_id)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl EntryContext {
    /// Config entry this context was set up from
    pub const fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    /// Id of the owning config entry
    pub fn entry_id(&self) -> &str {
        &self.entry.entry_id
    }

    /// Token store writing to the entry's data
    pub const fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Throttled backend client
    pub const fn client(&self) -> &Arc<PolledClient> {
        &self.client
    }

    /// Flight calendar for this account
    pub fn calendar(&self) -> FlightCalendar {
        FlightCalendar::new(Arc::clone(&self.client))
    }

    /// Unstaffed-flight query for this account
    pub fn unstaffed_flights(&self) -> UnstaffedFlightsService {
        UnstaffedFlightsService::new(Arc::clone(&self.client))
    }
}

/// Owner of the set-up entries and their services
pub struct CrewConnectIntegration {
    storage: Arc<dyn EntryStorage>,
    connector: Arc<dyn ClientConnector>,
    services: Arc<ServiceRegistry>,
    cooldown: Duration,
    contexts: RwLock<HashMap<String, Arc<EntryContext>>>,
}

impl CrewConnectIntegration {
    /// Integration with no entries set up yet
    pub fn new(
        storage: Arc<dyn EntryStorage>,
        connector: Arc<dyn ClientConnector>,
        services: Arc<ServiceRegistry>,
        polling: &PollingConfig,
    ) -> Self {
        Self {
            storage,
            connector,
            services,
            cooldown: Duration::from_secs(polling.min_time_between_updates_seconds),
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Registry the entries register their services in
    pub const fn services(&self) -> &Arc<ServiceRegistry> {
        &self.services
    }

    /// Durable config entry storage
    pub const fn storage(&self) -> &Arc<dyn EntryStorage> {
        &self.storage
    }

    /// A new interactive flow for adding an account
    pub fn start_flow(&self) -> AuthorizationFlow {
        AuthorizationFlow::new(Arc::clone(&self.connector))
    }

    /// Persist the entry produced by a finished flow.
    ///
    /// # Errors
    /// `Validation` if the flow has not finished, otherwise storage errors.
    pub fn create_entry(&self, result: FlowResult) -> Result<ConfigEntry> {
        match result {
            FlowResult::CreateEntry { title, data } => {
                let entry = self.storage.create_entry(&title, data)?;
                info!(entry_id = %entry.entry_id, title = %entry.title, "Config entry created");
                Ok(entry)
            }
            FlowResult::ShowForm(form) => Err(CrewConnectError::Validation(format!(
                "flow has not finished (showing {})",
                form.step_id
            ))),
        }
    }

    /// Set up an entry: token store, client, first refresh, services.
    ///
    /// # Errors
    /// `Config` when the entry has no host; connection and first refresh
    /// errors propagate and leave nothing registered.
    #[instrument(skip(self, entry), fields(entry_id = %entry.entry_id))]
    pub async fn setup_entry(&self, entry: ConfigEntry) -> Result<Arc<EntryContext>> {
        let host = entry
            .data
            .host()
            .ok_or_else(|| {
                CrewConnectError::Config(format!("entry {} has no host", entry.entry_id))
            })?
            .to_string();

        let tokens = Arc::new(TokenStore::initialize(&entry, Arc::clone(&self.storage)));
        let client = self.connector.connect(&host, ClientAuth::TokenManager(tokens.clone())).await?;
        let client = Arc::new(PolledClient::new(client, self.cooldown));

        client.refresh().await?;

        let context = Arc::new(EntryContext { entry, tokens, client });
        self.services.register(
            DOMAIN,
            SERVICE_FIND_UNSTAFFED_FLIGHTS,
            context.entry_id(),
            validate_unstaffed_flights,
            FindUnstaffedFlightsHandler::shared(context.unstaffed_flights()),
        );

        if let Some(previous) =
            self.contexts.write().insert(context.entry_id().to_string(), Arc::clone(&context))
        {
            info!(entry_id = %previous.entry_id(), "Replaced previous context");
        }

        info!(host = %host, user_id = ?context.client.user_id(), "Config entry set up");
        Ok(context)
    }

    /// Set up every stored entry; failures are logged and skipped.
    ///
    /// # Errors
    /// Returns storage errors from listing the entries.
    pub async fn setup_all(&self) -> Result<Vec<Arc<EntryContext>>> {
        let mut contexts = Vec::new();
        for entry in self.storage.entries()? {
            let entry_id = entry.entry_id.clone();
            match self.setup_entry(entry).await {
                Ok(context) => contexts.push(context),
                Err(err) => error!(entry_id = %entry_id, error = %err, "Config entry setup failed"),
            }
        }
        Ok(contexts)
    }

    /// Drop an entry's context and remove its services.
    ///
    /// A service another set-up entry also registered falls back to that
    /// entry.
    ///
    /// Returns `false` if the entry was not set up.
    pub fn unload_entry(&self, entry_id: &str) -> bool {
        let Some(context) = self.contexts.write().remove(entry_id) else {
            return false;
        };
        self.services.unregister_owner(context.entry_id());
        info!(entry_id, "Config entry unloaded");
        true
    }

    /// Unload an entry and delete it from storage.
    ///
    /// # Errors
    /// Returns storage errors.
    pub fn remove_entry(&self, entry_id: &str) -> Result<bool> {
        self.unload_entry(entry_id);
        self.storage.remove_entry(entry_id)
    }

    /// Context of a set-up entry
    pub fn context(&self, entry_id: &str) -> Option<Arc<EntryContext>> {
        self.contexts.read().get(entry_id).cloned()
    }

    /// Set-up contexts, ordered by entry id
    pub fn contexts(&self) -> Vec<Arc<EntryContext>> {
        let mut contexts: Vec<_> = self.contexts.read().values().cloned().collect();
        contexts.sort_by(|a, b| a.entry_id().cmp(b.entry_id()));
        contexts
    }

    /// Data of a stored entry
    ///
    /// # Errors
    /// `NotFound` when the entry does not exist.
    pub fn entry_data(&self, entry_id: &str) -> Result<EntryData> {
        self.storage
            .entry(entry_id)?
            .map(|entry| entry.data)
            .ok_or_else(|| CrewConnectError::NotFound(format!("config entry {entry_id}")))
    }
}
