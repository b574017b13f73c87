//! Interval scheduler for background cache refreshes.
//!
//! Periodically runs the aggregation engine over the current month so
//! the local cache stays warm. Each tick is best-effort: a failed run
//! is logged and the loop keeps going.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use redtrack_core::progress::calendar::month_bounds;
use redtrack_core::ProgressService;
use redtrack_domain::FetchSettings;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the fetch scheduler
#[derive(Debug, Clone)]
pub struct FetchSchedulerConfig {
    /// Interval between refresh runs
    pub interval: Duration,
}

impl Default for FetchSchedulerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(3600) }
    }
}

impl FetchSchedulerConfig {
    /// Derive the scheduler interval from the loaded settings.
    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self { interval: Duration::from_secs(settings.interval_secs.max(1)) }
    }
}

/// Background scheduler refreshing the time-entry cache.
pub struct FetchScheduler {
    service: Arc<ProgressService>,
    config: FetchSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl FetchScheduler {
    /// Create a new fetch scheduler over the aggregation engine.
    pub fn new(service: Arc<ProgressService>, config: FetchSchedulerConfig) -> Self {
        Self {
            service,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scheduler.
    ///
    /// Spawns a background task that refreshes the cache periodically.
    ///
    /// # Errors
    /// Returns [`SchedulerError::AlreadyRunning`] when already started.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting fetch scheduler");

        // Fresh token so the scheduler can restart after a stop.
        self.cancellation_token = CancellationToken::new();

        let service = Arc::clone(&self.service);
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::fetch_loop(service, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Fetch scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully.
    ///
    /// # Errors
    /// Returns [`SchedulerError::NotRunning`] when not started.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping fetch scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Fetch scheduler stopped");
        Ok(())
    }

    /// Check if the scheduler is running.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn fetch_loop(
        service: Arc<ProgressService>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Fetch loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let today = Utc::now().date_naive();
                    let (start, end) = month_bounds(today);

                    match service.individual_progress_stats(start, end, None).await {
                        Ok(stats) => {
                            info!(users = stats.len(), start = %start, end = %end, "Cache refresh completed");
                        }
                        Err(e) => {
                            error!(error = %e, "Cache refresh failed");
                        }
                    }
                }
            }
        }
    }
}

/// Ensure the background task stops when the scheduler is dropped.
impl Drop for FetchScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            warn!("FetchScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
