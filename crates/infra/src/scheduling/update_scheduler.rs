//! Update scheduler for periodic backend refreshes.
//!
//! Ticks at a fixed interval and calls [`PolledClient::try_refresh`] on every
//! registered client. The client's own cool-down still applies, so a tick
//! arriving inside the window is a no-op. Failures are logged and the loop
//! keeps running.
//!
//! A refresh that has started always runs to completion: it is spawned as its
//! own task, cancellation is only observed between clients and between ticks,
//! and the job timeout stops the loop from waiting without dropping the task.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use crewconnect_core::PolledClient;
//! use crewconnect_infra::scheduling::{UpdateScheduler, UpdateSchedulerConfig};
//!
//! # async fn example(client: Arc<PolledClient>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut scheduler = UpdateScheduler::new(
//!     vec![client],
//!     UpdateSchedulerConfig { interval: Duration::from_secs(900), ..Default::default() },
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crewconnect_core::{PolledClient, RefreshOutcome};
use crewconnect_domain::PollingConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the update scheduler
#[derive(Debug, Clone)]
pub struct UpdateSchedulerConfig {
    /// Tick interval
    pub interval: Duration,
    /// Timeout for a single client refresh
    pub job_timeout: Duration,
    /// Timeout for joining the background task on stop
    pub join_timeout: Duration,
}

impl Default for UpdateSchedulerConfig {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for UpdateSchedulerConfig {
    fn from(polling: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_secs(polling.update_interval_seconds.max(1)),
            job_timeout: Duration::from_secs(polling.job_timeout_seconds.max(1)),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Scheduler refreshing a set of polled clients in the background
pub struct UpdateScheduler {
    clients: Vec<Arc<PolledClient>>,
    config: UpdateSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl UpdateScheduler {
    /// Scheduler for `clients`; nothing runs until `start`
    pub fn new(clients: Vec<Arc<PolledClient>>, config: UpdateSchedulerConfig) -> Self {
        Self {
            clients,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &UpdateSchedulerConfig {
        &self.config
    }

    /// Start the scheduler
    ///
    /// Spawns a background task that refreshes every client each interval.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self), fields(clients = self.clients.len()))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting update scheduler");

        // Fresh token so the scheduler can restart after stop
        self.cancellation_token = CancellationToken::new();

        let clients = self.clients.clone();
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::update_loop(clients, config, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Update scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the background task and awaits completion. A refresh already
    /// in flight finishes first.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running, or the task did not finish
    /// within the join timeout
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping update scheduler");
        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })??;
        }

        info!("Update scheduler stopped");
        Ok(())
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Background update loop
    async fn update_loop(
        clients: Vec<Arc<PolledClient>>,
        config: UpdateSchedulerConfig,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Update loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.interval) => {
                    let started = Instant::now();
                    for client in &clients {
                        if cancel.is_cancelled() {
                            break;
                        }
                        if let Err(e) = Self::refresh_one(client, config.job_timeout).await {
                            error!(host = %client.host(), error = %e, "Scheduled refresh failed");
                        }
                    }
                    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Update tick completed");
                }
            }
        }
    }

    /// Run one refresh on its own task
    ///
    /// On timeout the task is detached, not aborted, so tokens it has already
    /// obtained are still written back.
    async fn refresh_one(
        client: &Arc<PolledClient>,
        job_timeout: Duration,
    ) -> crewconnect_domain::Result<()> {
        let task = tokio::spawn({
            let client = Arc::clone(client);
            async move { client.try_refresh().await }
        });

        let joined = tokio::time::timeout(job_timeout, task).await.map_err(|_| {
            warn!(host = %client.host(), "Refresh exceeded job timeout; left running");
            SchedulerError::Timeout { seconds: job_timeout.as_secs() }
        })?;

        match joined.map_err(SchedulerError::from)?? {
            RefreshOutcome::Refreshed => {
                info!(host = %client.host(), user_id = ?client.user_id(), "Client refreshed");
            }
            RefreshOutcome::Throttled => {
                debug!(host = %client.host(), "Refresh throttled");
            }
        }
        Ok(())
    }
}
