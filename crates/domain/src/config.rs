//! Configuration structures
//!
//! Loaded by `crewconnect_infra::config`; every section has defaults so a
//! partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_TIME_BETWEEN_UPDATES_SECS;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub polling: PollingConfig,
    pub storage: StorageConfig,
}

/// Settings for the CrewConnect backend client and its identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Identity provider authorization endpoint.
    pub authorization_endpoint: String,
    /// Identity provider token endpoint.
    pub token_endpoint: String,
    pub client_id: String,
    /// Redirect URI registered with the identity provider. The browser lands
    /// here after login; the user pastes the resulting URL back into setup.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Path on the backend host that exchanges an identity token for a
    /// backend token.
    pub token_exchange_path: String,
    /// Path on the backend host returning the signed-in user.
    pub profile_path: String,
    /// Path on the backend host returning the flight schedule.
    pub schedule_path: String,
    pub request_timeout_seconds: u64,
    /// Refresh tokens this many seconds before they expire.
    pub refresh_threshold_seconds: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            authorization_endpoint: "https://login.crewconnect.aero/oauth2/default/v1/authorize"
                .to_string(),
            token_endpoint: "https://login.crewconnect.aero/oauth2/default/v1/token".to_string(),
            client_id: "crewconnect-mobile".to_string(),
            redirect_uri: "com.apm.crewconnect:/callback".to_string(),
            scopes: vec![
                "openid".to_string(),
                "profile".to_string(),
                "offline_access".to_string(),
            ],
            token_exchange_path: "/api/auth/okta".to_string(),
            profile_path: "/api/users/me".to_string(),
            schedule_path: "/api/flights".to_string(),
            request_timeout_seconds: 30,
            refresh_threshold_seconds: 300,
        }
    }
}

/// Throttled polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Cool-down between two real refreshes of the backend.
    pub min_time_between_updates_seconds: u64,
    /// Interval of the background update scheduler (`watch`).
    pub update_interval_seconds: u64,
    /// Timeout applied to a single scheduled refresh.
    pub job_timeout_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            min_time_between_updates_seconds: MIN_TIME_BETWEEN_UPDATES_SECS,
            update_interval_seconds: 900,
            job_timeout_seconds: 120,
        }
    }
}

/// Config entry storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the config entries.
    pub entries_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { entries_path: "crewconnect_entries.json".to_string() }
    }
}
