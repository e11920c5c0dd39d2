//! Opens HTTP clients against a CrewConnect host

use std::sync::Arc;

use async_trait::async_trait;
use crewconnect_core::{ClientAuth, ClientConnector, CrewConnectClient};
use crewconnect_domain::{ClientConfig, CrewConnectError, Result};
use reqwest::Method;
use tracing::{debug, instrument, warn};

use super::client::{base_url_for, HttpCrewConnectClient};
use crate::http::HttpClient;

/// [`ClientConnector`] producing [`HttpCrewConnectClient`]s
///
/// `connect` probes the host once; any HTTP response counts as reachable.
#[derive(Clone)]
pub struct HttpClientConnector {
    config: ClientConfig,
    http: HttpClient,
}

impl HttpClientConnector {
    /// Connector with its own HTTP client
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::for_config(&config)?;
        Ok(Self { config, http })
    }

    /// Connector sharing an existing [`HttpClient`]
    pub fn with_http_client(config: ClientConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a concrete client without the trait object
    ///
    /// # Errors
    /// `CrewConnectError::Connection` when the host is malformed or unreachable.
    pub async fn open(&self, host: &str, auth: ClientAuth) -> Result<HttpCrewConnectClient> {
        let base_url = base_url_for(host)
            .map_err(|err| CrewConnectError::Connection(format!("invalid host '{host}': {err}")))?;

        let probe = self.http.request(Method::GET, base_url.clone());
        match self.http.send(probe).await {
            Ok(response) => {
                debug!(%base_url, status = %response.status(), "Host reachable");
            }
            Err(err) => {
                warn!(%base_url, error = %err, "Host unreachable");
                return Err(CrewConnectError::Connection(err.to_string()));
            }
        }

        HttpCrewConnectClient::with_http_client(host, auth, self.config.clone(), self.http.clone())
    }
}

#[async_trait]
impl ClientConnector for HttpClientConnector {
    #[instrument(skip(self, auth))]
    async fn connect(&self, host: &str, auth: ClientAuth) -> Result<Arc<dyn CrewConnectClient>> {
        let client = self.open(host, auth).await?;
        Ok(Arc::new(client))
    }
}

impl std::fmt::Debug for HttpClientConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientConnector").field("config", &self.config).finish_non_exhaustive()
    }
}
