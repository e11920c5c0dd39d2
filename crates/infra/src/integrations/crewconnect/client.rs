//! HTTP client for the CrewConnect backend
//!
//! Login is a PKCE authorization-code flow against the identity provider.
//! The resulting identity ("okta") token is exchanged on the backend host for
//! a backend ("apm") token. Both are kept through a [`TokenCallback`], so the
//! caller decides where they live.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use crewconnect_core::{AuthorizedSession, ClientAuth, CrewConnectClient, TokenCallback};
use crewconnect_domain::constants::{TOKEN_APM, TOKEN_OKTA};
use crewconnect_domain::{ClientConfig, CrewConnectError, Flight, Result};
use parking_lot::RwLock;
use reqwest::{Method, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::pkce::PkceChallenge;
use super::tokens::MemoryTokens;
use super::types::{FlightDto, OAuthErrorBody, TokenResponse, TokenSet, UserProfile};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Schedule payload: either a bare list or wrapped in `data`
#[derive(Deserialize)]
#[serde(untagged)]
enum ScheduleResponse {
    List(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

impl ScheduleResponse {
    fn into_items(self) -> Vec<Value> {
        match self {
            Self::List(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// Error constructor used when a token request is rejected with a 4xx
type Rejection = fn(String) -> CrewConnectError;

/// CrewConnect backend client over HTTP
pub struct HttpCrewConnectClient {
    host: String,
    base_url: Url,
    config: ClientConfig,
    http: HttpClient,
    tokens: Arc<dyn TokenCallback>,
    pending: Mutex<Option<PkceChallenge>>,
    user_id: RwLock<Option<String>>,
}

impl HttpCrewConnectClient {
    /// Create a client for `host`
    ///
    /// `host` is a bare host name (`crew.example.com`, served over HTTPS) or a
    /// full base URL.
    ///
    /// # Errors
    /// Returns `CrewConnectError::Config` if the host does not form a valid URL.
    pub fn new(host: &str, auth: ClientAuth, config: ClientConfig) -> Result<Self> {
        let http = HttpClient::for_config(&config)?;
        Self::with_http_client(host, auth, config, http)
    }

    /// Create a client sharing an existing [`HttpClient`]
    pub fn with_http_client(
        host: &str,
        auth: ClientAuth,
        config: ClientConfig,
        http: HttpClient,
    ) -> Result<Self> {
        let base_url = base_url_for(host)?;
        let tokens: Arc<dyn TokenCallback> = match auth {
            ClientAuth::Manual => Arc::new(MemoryTokens::new()),
            ClientAuth::TokenManager(callback) => callback,
        };

        Ok(Self {
            host: host.trim().to_string(),
            base_url,
            config,
            http,
            tokens,
            pending: Mutex::new(None),
            user_id: RwLock::new(None),
        })
    }

    /// Base URL of the backend host
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Token callback the client reads and writes
    pub fn tokens(&self) -> &Arc<dyn TokenCallback> {
        &self.tokens
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path).map_err(InfraError::from)?)
    }

    fn stored_token(&self, name: &str) -> Result<Option<TokenSet>> {
        self.tokens
            .get(name)
            .filter(|value| !value.is_null())
            .map(|value| {
                serde_json::from_value::<TokenSet>(value).map_err(|err| {
                    CrewConnectError::Auth(format!("stored {name} token is unreadable: {err}"))
                })
            })
            .transpose()
    }

    /// POST a form to the identity provider's token endpoint
    async fn token_grant(
        &self,
        params: &[(&str, String)],
        rejected: Rejection,
    ) -> Result<TokenResponse> {
        let builder = self.http.request(Method::POST, &self.config.token_endpoint).form(params);
        let response = self.http.send(builder).await?;
        read_token_response(response, rejected).await
    }

    /// Exchange an identity token for a backend token
    async fn exchange_for_backend_token(
        &self,
        okta: &TokenSet,
        rejected: Rejection,
    ) -> Result<TokenSet> {
        let url = self.endpoint(&self.config.token_exchange_path)?;
        let builder =
            self.http.request(Method::POST, url).json(&json!({ "token": okta.identity_token() }));
        let response = self.http.send(builder).await?;
        let token = read_token_response(response, rejected).await?;
        Ok(token.into_token_set(Utc::now(), None))
    }

    async fn refresh_identity_token(&self, okta: &TokenSet) -> Result<TokenSet> {
        let refresh_token = okta.refresh_token.clone().ok_or_else(|| {
            CrewConnectError::Auth("identity token expired and no refresh token was issued".into())
        })?;

        let params = [
            ("grant_type", "refresh_token".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("refresh_token", refresh_token),
        ];
        let token = self.token_grant(&params, CrewConnectError::Auth).await?;
        Ok(token.into_token_set(Utc::now(), Some(okta)))
    }

    async fn fetch_profile(&self, apm: &TokenSet) -> Result<UserProfile> {
        let url = self.endpoint(&self.config.profile_path)?;
        let builder = self.http.request(Method::GET, url).bearer_auth(&apm.access_token);
        self.http.send_json(builder).await
    }

    fn write_tokens(&self, okta: &TokenSet, apm: &TokenSet) -> Result<()> {
        let mut tokens = self.tokens.get_all().unwrap_or_default();
        tokens.insert(TOKEN_OKTA.to_string(), to_value(okta)?);
        tokens.insert(TOKEN_APM.to_string(), to_value(apm)?);
        self.tokens.set_all(tokens)
    }
}

#[async_trait]
impl CrewConnectClient for HttpCrewConnectClient {
    fn host(&self) -> &str {
        &self.host
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn update(&self) -> Result<()> {
        let threshold = self.config.refresh_threshold_seconds;
        let okta = self
            .stored_token(TOKEN_OKTA)?
            .ok_or_else(|| CrewConnectError::Auth("no identity token stored".into()))?;

        let (okta, okta_refreshed) = if okta.is_expired(threshold) {
            debug!("Refreshing identity token");
            let okta = self.refresh_identity_token(&okta).await?;
            // The provider may have rotated the refresh token; keep the new
            // one even if the backend exchange below fails.
            self.tokens.set(TOKEN_OKTA, to_value(&okta)?)?;
            (okta, true)
        } else {
            (okta, false)
        };

        let apm = match self.stored_token(TOKEN_APM)? {
            Some(apm) if !okta_refreshed && !apm.is_expired(threshold) => apm,
            _ => {
                debug!("Exchanging identity token for backend token");
                let apm = self.exchange_for_backend_token(&okta, CrewConnectError::Auth).await?;
                self.write_tokens(&okta, &apm)?;
                apm
            }
        };

        let profile = self.fetch_profile(&apm).await?;
        debug!(user_id = %profile.id, "Profile loaded");
        *self.user_id.write() = Some(profile.id);
        Ok(())
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn get_flight_schedule(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Flight>> {
        let apm = self
            .stored_token(TOKEN_APM)?
            .ok_or_else(|| CrewConnectError::Auth("no backend token stored".into()))?;

        let end = end.unwrap_or(start);
        let url = self.endpoint(&self.config.schedule_path)?;
        let builder = self
            .http
            .request(Method::GET, url)
            .bearer_auth(&apm.access_token)
            .query(&[("from", start.to_string()), ("to", end.to_string())]);

        let response: ScheduleResponse = self.http.send_json(builder).await?;

        let flights: Vec<Flight> = response
            .into_items()
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<FlightDto>(item) {
                Ok(dto) => dto.into_flight(),
                Err(err) => {
                    warn!(error = %err, "Skipping malformed flight");
                    None
                }
            })
            .collect();

        debug!(count = flights.len(), %start, %end, "Flight schedule fetched");
        Ok(flights)
    }

    async fn generate_auth_url(&self) -> Result<String> {
        let challenge = PkceChallenge::generate();

        let params = [
            ("response_type", "code".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("scope", self.config.scopes.join(" ")),
            ("state", challenge.state.clone()),
            ("code_challenge", challenge.code_challenge.clone()),
            ("code_challenge_method", challenge.challenge_method().to_string()),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.config.authorization_endpoint.contains('?') { '&' } else { '?' };
        let url = format!("{}{separator}{query_string}", self.config.authorization_endpoint);

        *self.pending.lock().await = Some(challenge);
        Ok(url)
    }

    #[instrument(skip(self, redirect), fields(host = %self.host))]
    async fn authenticate_from_redirect(&self, redirect: &str) -> Result<AuthorizedSession> {
        let (code, state) = parse_redirect(redirect)?;

        let challenge = self.pending.lock().await.take().ok_or_else(|| {
            CrewConnectError::InvalidRedirect("no authorization in progress".into())
        })?;

        if let Some(state) = &state {
            if !challenge.matches_state(state) {
                return Err(CrewConnectError::InvalidRedirect("state mismatch".into()));
            }
        }

        let params = [
            ("grant_type", "authorization_code".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("code_verifier", challenge.code_verifier),
        ];
        let okta = self
            .token_grant(&params, CrewConnectError::InvalidRedirect)
            .await?
            .into_token_set(Utc::now(), None);

        let apm = self.exchange_for_backend_token(&okta, CrewConnectError::InvalidRedirect).await?;
        self.write_tokens(&okta, &apm)?;

        let profile = self.fetch_profile(&apm).await?;
        *self.user_id.write() = Some(profile.id.clone());
        info!(user_id = %profile.id, "Authorized CrewConnect user");

        Ok(AuthorizedSession {
            user_id: profile.id,
            apm_token: to_value(&apm)?,
            okta_token: to_value(&okta)?,
        })
    }
}

/// Base URL for a host name or URL
pub(crate) fn base_url_for(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(CrewConnectError::Config("host is empty".into()));
    }

    let raw = if host.contains("://") { host.to_string() } else { format!("https://{host}") };
    Ok(Url::parse(&raw).map_err(InfraError::from)?)
}

/// Authorization code and state from a redirect URL, or a bare code
fn parse_redirect(redirect: &str) -> Result<(String, Option<String>)> {
    let redirect = redirect.trim();
    if redirect.is_empty() {
        return Err(CrewConnectError::InvalidRedirect("redirect is empty".into()));
    }

    let Ok(url) = Url::parse(redirect) else {
        if redirect.chars().any(char::is_whitespace) {
            return Err(CrewConnectError::InvalidRedirect("not a URL or code".into()));
        }
        return Ok((redirect.to_string(), None));
    };

    let mut code = None;
    let mut state = None;
    let mut error = OAuthErrorBody::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error.error = value.into_owned(),
            "error_description" => error.error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if !error.error.is_empty() {
        return Err(CrewConnectError::InvalidRedirect(error.to_string()));
    }

    let code = code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| CrewConnectError::InvalidRedirect("redirect has no code".into()))?;
    Ok((code, state))
}

async fn read_token_response(response: Response, rejected: Rejection) -> Result<TokenResponse> {
    let status = response.status();
    if status.is_client_error() {
        let body: OAuthErrorBody = response.json().await.unwrap_or_default();
        return Err(rejected(format!("HTTP {}: {body}", status.as_u16())));
    }

    let response = response.error_for_status().map_err(InfraError::from)?;
    Ok(response.json::<TokenResponse>().await.map_err(InfraError::from)?)
}

fn to_value(token: &TokenSet) -> Result<Value> {
    Ok(serde_json::to_value(token).map_err(InfraError::from)?)
}

impl std::fmt::Debug for HttpCrewConnectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCrewConnectClient")
            .field("host", &self.host)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
