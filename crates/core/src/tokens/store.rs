//! Config-entry backed token store
//!
//! Holds the in-memory copy of the client's tokens and writes them through
//! to the owning config entry on every change:
//! - Load on construction (`apm_token` → `apm`, `okta_token` → `okta`)
//! - Write-through on `set` / `set_all`; a `null`, `false` or empty value
//!   removes the token, matching how the entry is read back
//! - Memory is only replaced after the entry was written

use std::sync::Arc;

use crewconnect_domain::constants::PERSISTED_TOKENS;
use crewconnect_domain::{is_present, ConfigEntry, CrewConnectError, Result, TokenMap};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use super::ports::TokenCallback;
use crate::entries::ports::EntryStorage;

/// Token store bound to one config entry
///
/// The write lock is held across persistence, so concurrent writers are
/// serialized and the in-memory map always equals the last persisted value.
pub struct TokenStore {
    entry_id: String,
    storage: Arc<dyn EntryStorage>,
    tokens: RwLock<TokenMap>,
}

impl TokenStore {
    /// Build the store from an entry's persisted data
    ///
    /// Missing, null or empty token keys are simply absent.
    pub fn initialize(entry: &ConfigEntry, storage: Arc<dyn EntryStorage>) -> Self {
        let tokens = entry.data.tokens();
        debug!(entry_id = %entry.entry_id, count = tokens.len(), "Token store initialized");

        Self { entry_id: entry.entry_id.clone(), storage, tokens: RwLock::new(tokens) }
    }

    /// Id of the config entry this store writes to
    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    fn write_with(&self, update: impl FnOnce(&mut TokenMap)) -> Result<()> {
        let mut tokens = self.tokens.write();
        let mut next = tokens.clone();
        update(&mut next);

        self.persist(&next)?;
        *tokens = next;
        Ok(())
    }

    /// Write the known tokens of `tokens` into the entry data
    ///
    /// A known token absent from `tokens` is removed from the entry data.
    fn persist(&self, tokens: &TokenMap) -> Result<()> {
        let entry = self
            .storage
            .entry(&self.entry_id)
            .map_err(|err| persistence_error(&self.entry_id, err))?
            .ok_or_else(|| {
                CrewConnectError::Persistence(format!(
                    "config entry {} no longer exists",
                    self.entry_id
                ))
            })?;

        let mut data = entry.data;
        for (name, key) in PERSISTED_TOKENS {
            match tokens.get(name) {
                Some(value) => {
                    data.insert(key, value.clone());
                }
                None => {
                    data.remove(key);
                }
            }
        }

        self.storage
            .update_entry_data(&self.entry_id, data)
            .map_err(|err| persistence_error(&self.entry_id, err))?;

        debug!(entry_id = %self.entry_id, "Tokens persisted to config entry");
        Ok(())
    }
}

fn persistence_error(entry_id: &str, err: CrewConnectError) -> CrewConnectError {
    warn!(entry_id = %entry_id, error = %err, "Failed to persist tokens");
    match err {
        CrewConnectError::Persistence(_) => err,
        other => CrewConnectError::Persistence(other.to_string()),
    }
}

impl TokenCallback for TokenStore {
    fn get(&self, name: &str) -> Option<Value> {
        self.tokens.read().get(name).cloned()
    }

    fn get_all(&self) -> Option<TokenMap> {
        let tokens = self.tokens.read();
        (!tokens.is_empty()).then(|| tokens.clone())
    }

    fn set(&self, name: &str, value: Value) -> Result<()> {
        self.write_with(|tokens| {
            if is_present(&value) {
                tokens.insert(name.to_string(), value);
            } else {
                tokens.remove(name);
            }
        })
    }

    fn set_all(&self, mut tokens: TokenMap) -> Result<()> {
        tokens.retain(|_, value| is_present(value));
        self.write_with(|current| *current = tokens)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("entry_id", &self.entry_id)
            .field("tokens", &self.tokens.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
