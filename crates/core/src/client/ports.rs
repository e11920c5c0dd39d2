//! Port interfaces for the CrewConnect backend client
//!
//! The client library itself lives in infrastructure; core only drives it
//! through these traits.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use crewconnect_domain::{Flight, Result};
use serde_json::Value;

use crate::tokens::TokenCallback;

/// Tokens and identity minted by a successful authorization
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedSession {
    pub user_id: String,
    /// Backend ("apm") token blob.
    pub apm_token: Value,
    /// Identity provider ("okta") token blob.
    pub okta_token: Value,
}

/// How a client obtains and stores its tokens
#[derive(Clone)]
pub enum ClientAuth {
    /// Tokens are minted interactively and kept by the client itself.
    Manual,
    /// Tokens are read from and written back through the given callback.
    TokenManager(Arc<dyn TokenCallback>),
}

impl fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => f.write_str("Manual"),
            Self::TokenManager(_) => f.write_str("TokenManager(..)"),
        }
    }
}

/// Trait for the CrewConnect backend client
#[async_trait]
pub trait CrewConnectClient: Send + Sync {
    /// Backend host this client talks to
    fn host(&self) -> &str;

    /// Identity of the signed-in user, once known
    fn user_id(&self) -> Option<String>;

    /// Refresh tokens if needed and reload the user profile
    async fn update(&self) -> Result<()>;

    /// Fetch the flights departing between `start` and `end` (inclusive);
    /// a single day when `end` is `None`
    async fn get_flight_schedule(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Flight>>;

    /// Build a fresh authorization URL for interactive login
    async fn generate_auth_url(&self) -> Result<String>;

    /// Exchange a redirect URL (or bare code) for tokens
    async fn authenticate_from_redirect(&self, redirect: &str) -> Result<AuthorizedSession>;
}

/// Trait for opening a client against a host
#[async_trait]
pub trait ClientConnector: Send + Sync {
    /// Connect to `host`; fails with `CrewConnectError::Connection` when the
    /// host cannot be reached
    async fn connect(&self, host: &str, auth: ClientAuth) -> Result<Arc<dyn CrewConnectClient>>;
}
