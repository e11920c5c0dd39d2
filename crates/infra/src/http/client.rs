//! Retrying HTTP transport shared by the connector and the backend client
//!
//! Reads (`GET`, `HEAD`) are replayed after a transport failure or a 5xx
//! answer. Every other request is sent exactly once, so a single-use
//! authorization code or a rotating refresh token is never redeemed twice.

use std::time::Duration;

use crewconnect_domain::{ClientConfig, CrewConnectError, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("crewconnect/", env!("CARGO_PKG_VERSION"));

/// How often and how patiently reads are replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts for a replayable request (initial try + retries)
    pub max_attempts: usize,
    /// Delay before the first retry; doubles per retry
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_backoff: Duration::from_millis(200) }
    }
}

impl RetryPolicy {
    /// Attempts allowed for a request with `method`
    pub fn attempts_for(&self, method: &Method) -> usize {
        if is_replayable(method) {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Delay before retry number `retry` (1-based), capped at 256x the base
    pub fn delay(&self, retry: usize) -> Duration {
        let shift = retry.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1u32 << shift)
    }
}

fn is_replayable(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// reqwest client with the CrewConnect retry policy applied
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Start building a client
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client using the request timeout from `config`
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn for_config(config: &ClientConfig) -> Result<Self> {
        Self::builder().timeout(Duration::from_secs(config.request_timeout_seconds)).build()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Request builder on the underlying reqwest client
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, replaying reads per the [`RetryPolicy`]
    ///
    /// Non-2xx responses are returned as-is; only transport failures are
    /// errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(InfraError::from)?;
        let method = request.method().clone();
        let url = request.url().clone();
        let attempts = self.retry.attempts_for(&method);

        let mut pending = Some(request);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let replay = if attempt < attempts {
                pending.as_ref().and_then(reqwest::Request::try_clone)
            } else {
                None
            };
            let Some(request) = pending.take() else {
                return Err(CrewConnectError::Internal(format!("{method} {url}: no request left")));
            };

            debug!(attempt, %method, %url, "Sending HTTP request");
            let outcome = self.client.execute(request).await;

            let retryable = match &outcome {
                Ok(response) => response.status().is_server_error(),
                Err(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            };
            if !retryable || replay.is_none() {
                return match outcome {
                    Ok(response) => {
                        debug!(attempt, %method, %url, status = %response.status(), "HTTP response");
                        Ok(response)
                    }
                    Err(err) => Err(InfraError::from(err).into()),
                };
            }

            match &outcome {
                Ok(response) => {
                    warn!(attempt, %method, %url, status = %response.status(), "Retrying after server error");
                }
                Err(err) => {
                    warn!(attempt, %method, %url, error = %err, "Retrying after transport error");
                }
            }
            let delay = self.retry.delay(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            pending = replay;
        }
    }

    /// Send, require a success status and decode the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let response = response.error_for_status().map_err(InfraError::from)?;
        Ok(response.json::<T>().await.map_err(InfraError::from)?)
    }
}

/// Builder for [`HttpClient`]
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), retry: RetryPolicy::default() }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts for reads
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.retry.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.retry.base_backoff = backoff;
        self
    }

    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn build(self) -> Result<HttpClient> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .map_err(InfraError::from)?;

        Ok(HttpClient { client, retry: self.retry })
    }
}
