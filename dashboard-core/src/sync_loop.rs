//! Periodic refresh of the incident store.
//!
//! Every tick first checks the modal guard. A suspended tick is dropped, not
//! deferred. Ticks that go ahead run their fetch on a separate task so a slow
//! backend never holds up the schedule, and the guard is checked once more
//! when the response lands: anything that arrives after a modal opened (or
//! after teardown) is discarded.
//!
//! At most [`MAX_FETCHES_IN_FLIGHT`] fetches run at once. Without a
//! `request_timeout` a backend that never answers holds those slots forever
//! and later ticks are skipped, so production setups should set one.

use crate::backend::Backend;
use crate::error::BackendError;
use crate::modal::ModalGuard;
use crate::store::{IncidentStore, ReplaceOutcome};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Ticks that would exceed this many outstanding fetches are skipped.
pub const MAX_FETCHES_IN_FLIGHT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(usize),
    Malformed,
    Rejected(u16),
    Failed,
    Discarded,
}

/// The only path that writes the store: fetch `/data`, then apply it.
#[derive(Clone)]
pub struct Refresher {
    backend: Arc<dyn Backend>,
    store: IncidentStore,
}

impl Refresher {
    pub fn new(backend: Arc<dyn Backend>, store: IncidentStore) -> Self {
        Self { backend, store }
    }

    pub fn store(&self) -> &IncidentStore {
        &self.store
    }

    /// Fetches a snapshot and applies it if `still_wanted` holds once the
    /// response is in. Failures are logged and never escalate.
    pub async fn refresh_if(&self, still_wanted: impl Fn() -> bool) -> RefreshOutcome {
        let payload = match self.backend.fetch_incidents().await {
            Ok(payload) => payload,
            Err(BackendError::Status { status, .. }) => {
                debug!(status, "incident fetch answered non-success, keeping snapshot");
                return RefreshOutcome::Rejected(status);
            }
            Err(err) => {
                warn!("incident fetch failed: {err}");
                return RefreshOutcome::Failed;
            }
        };

        if !still_wanted() {
            debug!("discarding incident snapshot that arrived too late");
            return RefreshOutcome::Discarded;
        }

        match self.store.replace_json(payload) {
            ReplaceOutcome::Replaced(count) => RefreshOutcome::Applied(count),
            ReplaceOutcome::Ignored => RefreshOutcome::Malformed,
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresh_if(|| true).await
    }
}

/// Handle to the running poll task. Dropping it stops polling.
pub struct SyncLoop {
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SyncLoop {
    /// Starts polling immediately; must be called inside a tokio runtime.
    pub fn spawn(
        refresher: Refresher,
        modals: Arc<ModalGuard>,
        period: Duration,
        token: CancellationToken,
    ) -> Self {
        let loop_token = token.clone();
        let slots = Arc::new(Semaphore::new(MAX_FETCHES_IN_FLIGHT));
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(period_ms = period.as_millis() as u64, "incident sync started");

            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if modals.polling_suspended() {
                            debug!("modal open, skipping sync tick");
                            continue;
                        }
                        let Ok(permit) = slots.clone().try_acquire_owned() else {
                            debug!("too many fetches outstanding, skipping sync tick");
                            continue;
                        };
                        spawn_fetch(refresher.clone(), modals.clone(), loop_token.clone(), permit);
                    }
                }
            }

            info!("incident sync stopped");
        });

        Self {
            token,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Cancels the schedule and waits for the poll task to wind down.
    /// In-flight fetches are left to finish and their results dropped.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for SyncLoop {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn spawn_fetch(
    refresher: Refresher,
    modals: Arc<ModalGuard>,
    token: CancellationToken,
    permit: OwnedSemaphorePermit,
) {
    tokio::spawn(async move {
        let _permit = permit;
        let outcome = refresher
            .refresh_if(|| !token.is_cancelled() && !modals.polling_suspended())
            .await;
        if let RefreshOutcome::Applied(count) = outcome {
            debug!(count, "incident snapshot refreshed");
        }
    });
}
