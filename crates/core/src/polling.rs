//! Throttled polling of the backend
//!
//! A refresh executes at most once per cool-down window. The window starts
//! when a refresh succeeds; failed refreshes propagate and leave it closed.
//! Overlapping callers are coalesced: the throttle lock is held across the
//! fetch, so a caller arriving mid-fetch waits and then observes the new
//! window instead of fetching again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crewconnect_domain::{Flight, Result};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::client::ports::CrewConnectClient;

/// What a throttled refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The underlying operation ran and succeeded.
    Refreshed,
    /// Skipped; the last success is within the cool-down window.
    Throttled,
}

/// Minimum interval between successful executions of an operation
#[derive(Debug)]
pub struct Throttle {
    cooldown: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Throttle whose window has never been opened
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last_run: Mutex::new(None) }
    }

    /// Minimum time between two successful runs
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Run `operation` unless the cool-down window is still open.
    ///
    /// # Errors
    /// Returns the operation's error; the window is not reset on failure.
    pub async fn run<F, Fut>(&self, operation: F) -> Result<RefreshOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut last_run = self.last_run.lock().await;

        if let Some(at) = *last_run {
            if at.elapsed() < self.cooldown {
                return Ok(RefreshOutcome::Throttled);
            }
        }

        operation().await?;
        *last_run = Some(Instant::now());
        Ok(RefreshOutcome::Refreshed)
    }

    /// Time since the last successful run
    pub async fn since_last_run(&self) -> Option<Duration> {
        self.last_run.lock().await.map(|at| at.elapsed())
    }
}

/// Backend client with a throttled `refresh`
pub struct PolledClient {
    client: Arc<dyn CrewConnectClient>,
    throttle: Throttle,
}

impl PolledClient {
    /// Wrap `client` so refreshes respect `cooldown`
    pub fn new(client: Arc<dyn CrewConnectClient>, cooldown: Duration) -> Self {
        Self { client, throttle: Throttle::new(cooldown) }
    }

    /// Refresh the client unless it was refreshed within the cool-down.
    ///
    /// Calls within the window are no-ops and return the same `Ok(())`.
    ///
    /// # Errors
    /// Propagates the client's update error.
    pub async fn refresh(&self) -> Result<()> {
        self.try_refresh().await.map(|_| ())
    }

    /// Like [`refresh`](Self::refresh), reporting whether the backend was hit.
    ///
    /// # Errors
    /// Propagates the client's update error.
    #[instrument(skip(self), fields(host = %self.client.host()))]
    pub async fn try_refresh(&self) -> Result<RefreshOutcome> {
        let outcome = self.throttle.run(|| self.client.update()).await?;
        match outcome {
            RefreshOutcome::Refreshed => debug!("Backend refreshed"),
            RefreshOutcome::Throttled => debug!("Refresh skipped within cool-down"),
        }
        Ok(outcome)
    }

    /// Flight schedule for one day or an inclusive date range
    ///
    /// # Errors
    /// Propagates the client's fetch error.
    pub async fn get_flight_schedule(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Flight>> {
        self.client.get_flight_schedule(start, end).await
    }

    /// Host of the wrapped client
    pub fn host(&self) -> &str {
        self.client.host()
    }

    /// User id loaded by the last refresh
    pub fn user_id(&self) -> Option<String> {
        self.client.user_id()
    }

    /// Wrapped client
    pub fn client(&self) -> &Arc<dyn CrewConnectClient> {
        &self.client
    }

    /// Throttle guarding `update`
    pub const fn throttle(&self) -> &Throttle {
        &self.throttle
    }
}
