use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use crewconnect_core::{AuthorizedSession, ClientAuth, ClientConnector, CrewConnectClient};
use crewconnect_domain::{CrewConnectError, Flight, Result as DomainResult};
use serde_json::{json, Value};

pub const HOST: &str = "crew.example.com";
pub const VALID_REDIRECT: &str = "com.apm.crewconnect:/callback?code=good&state=s";
pub const USER_ID: &str = "pilot-042";

/// Scriptable mock for `CrewConnectClient`.
///
/// Serves a fixed flight list (filtered by departure date like the backend),
/// counts updates, and accepts exactly one redirect string.
pub struct MockClient {
    host: String,
    flights: Mutex<Vec<Flight>>,
    auth: Mutex<Option<ClientAuth>>,
    update_delay: Mutex<Option<Duration>>,
    fail_updates: AtomicBool,
    refreshed_apm_token: Mutex<Option<Value>>,
    updates: AtomicUsize,
    auth_urls: AtomicUsize,
    schedule_requests: Mutex<Vec<(NaiveDate, Option<NaiveDate>)>>,
}

impl MockClient {
    pub fn new(flights: Vec<Flight>) -> Self {
        Self {
            host: HOST.to_string(),
            flights: Mutex::new(flights),
            auth: Mutex::new(None),
            update_delay: Mutex::new(None),
            fail_updates: AtomicBool::new(false),
            refreshed_apm_token: Mutex::new(None),
            updates: AtomicUsize::new(0),
            auth_urls: AtomicUsize::new(0),
            schedule_requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long inside every `update`.
    pub fn with_update_delay(self, delay: Duration) -> Self {
        *self.update_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Write this token through the token callback on every `update`.
    pub fn with_refreshed_apm_token(self, token: Value) -> Self {
        *self.refreshed_apm_token.lock().unwrap() = Some(token);
        self
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn auth_url_count(&self) -> usize {
        self.auth_urls.load(Ordering::SeqCst)
    }

    pub fn schedule_requests(&self) -> Vec<(NaiveDate, Option<NaiveDate>)> {
        self.schedule_requests.lock().unwrap().clone()
    }

    pub fn was_connected_manually(&self) -> bool {
        matches!(*self.auth.lock().unwrap(), Some(ClientAuth::Manual))
    }

    pub fn session() -> AuthorizedSession {
        AuthorizedSession {
            user_id: USER_ID.to_string(),
            apm_token: json!({"access_token": "apm-access", "refresh_token": "apm-refresh"}),
            okta_token: json!({"access_token": "okta-access", "id_token": "okta-id"}),
        }
    }

    fn attach(&self, auth: ClientAuth) {
        *self.auth.lock().unwrap() = Some(auth);
    }
}

#[async_trait]
impl CrewConnectClient for MockClient {
    fn host(&self) -> &str {
        &self.host
    }

    fn user_id(&self) -> Option<String> {
        (self.update_count() > 0).then(|| USER_ID.to_string())
    }

    async fn update(&self) -> DomainResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);

        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(CrewConnectError::Network("backend unavailable".into()));
        }

        let token = self.refreshed_apm_token.lock().unwrap().clone();
        let auth = self.auth.lock().unwrap().clone();
        if let (Some(token), Some(ClientAuth::TokenManager(callback))) = (token, auth) {
            callback.set("apm", token)?;
        }
        Ok(())
    }

    async fn get_flight_schedule(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> DomainResult<Vec<Flight>> {
        self.schedule_requests.lock().unwrap().push((start, end));
        let last = end.unwrap_or(start);
        Ok(self
            .flights
            .lock()
            .unwrap()
            .iter()
            .filter(|flight| {
                let day = flight.departure_time.date_naive();
                day >= start && day <= last
            })
            .cloned()
            .collect())
    }

    async fn generate_auth_url(&self) -> DomainResult<String> {
        let attempt = self.auth_urls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://login.example.com/authorize?attempt={attempt}"))
    }

    async fn authenticate_from_redirect(&self, redirect: &str) -> DomainResult<AuthorizedSession> {
        if redirect == VALID_REDIRECT {
            Ok(Self::session())
        } else {
            Err(CrewConnectError::InvalidRedirect(format!("unexpected redirect {redirect}")))
        }
    }
}

/// Mock `ClientConnector` handing out one shared `MockClient`.
///
/// Only [`HOST`] is reachable; every other host fails with `Connection`.
pub struct MockConnector {
    client: Arc<MockClient>,
    connects: AtomicUsize,
}

impl MockConnector {
    pub fn new(client: Arc<MockClient>) -> Self {
        Self { client, connects: AtomicUsize::new(0) }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientConnector for MockConnector {
    async fn connect(
        &self,
        host: &str,
        auth: ClientAuth,
    ) -> DomainResult<Arc<dyn CrewConnectClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if host != HOST {
            return Err(CrewConnectError::Connection(format!("{host}: connection refused")));
        }
        self.client.attach(auth);
        Ok(self.client.clone())
    }
}
