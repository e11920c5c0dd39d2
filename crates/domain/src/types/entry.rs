//! Config entry and credential record types
//!
//! A config entry is the durable record of one configured crew-scheduling
//! account. Its `data` is an opaque JSON object owned by the entry storage;
//! the integration only relies on `host`, `apm_token` and `okta_token`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{CONF_APM_TOKEN, CONF_HOST, CONF_OKTA_TOKEN, PERSISTED_TOKENS};

/// Named tokens as seen by the client's token callback.
pub type TokenMap = BTreeMap<String, Value>;

/// Whether `value` counts as set: not `null`, `false` or empty.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Number(_) | Value::Bool(true) => true,
    }
}

/// Opaque key-value data of a config entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryData(Map<String, Value>);

impl EntryData {
    /// Empty entry data
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value of `key` unless it is missing, `null`, `false` or empty.
    pub fn get_present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| is_present(value))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Backend host the entry was configured for.
    pub fn host(&self) -> Option<&str> {
        self.get(CONF_HOST).and_then(Value::as_str)
    }

    /// Persisted tokens keyed by token name (`apm`, `okta`).
    pub fn tokens(&self) -> TokenMap {
        PERSISTED_TOKENS
            .iter()
            .filter_map(|(name, key)| {
                self.get_present(key).map(|value| ((*name).to_string(), value.clone()))
            })
            .collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for EntryData {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// One configured account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub domain: String,
    /// Display name; the resolved user identity.
    pub title: String,
    pub version: u32,
    pub data: EntryData,
}

/// Credential set produced by a successful authorization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub host: String,
    pub apm_token: Value,
    pub okta_token: Value,
}

impl CredentialRecord {
    /// Entry data holding exactly the host and both tokens.
    pub fn into_entry_data(self) -> EntryData {
        let mut data = EntryData::new();
        data.insert(CONF_HOST, Value::String(self.host));
        data.insert(CONF_APM_TOKEN, self.apm_token);
        data.insert(CONF_OKTA_TOKEN, self.okta_token);
        data
    }
}
