use crate::incidents::Snapshot;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// What the store currently holds.
#[derive(Clone, Debug, Default)]
pub struct StoreState {
    pub snapshot: Snapshot,
    pub last_update: Option<DateTime<Local>>,
}

impl StoreState {
    /// Local wall-clock time of the last good sync, `--:--:--` before the first.
    pub fn last_update_label(&self) -> String {
        self.last_update
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced(usize),
    Ignored,
}

/// Holds the latest incident snapshot and publishes every replacement.
///
/// Cloning hands out another handle to the same store.
#[derive(Clone)]
pub struct IncidentStore {
    tx: Arc<watch::Sender<StoreState>>,
}

impl Default for IncidentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IncidentStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> StoreState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.tx.subscribe()
    }

    /// Swaps in a whole new snapshot and stamps the receipt time.
    pub fn replace(&self, snapshot: Snapshot) -> ReplaceOutcome {
        let count = snapshot.len();
        self.tx.send_replace(StoreState {
            snapshot,
            last_update: Some(Local::now()),
        });
        ReplaceOutcome::Replaced(count)
    }

    /// Applies a raw `GET /data` payload. Anything that is not an array of
    /// objects leaves the previous snapshot in place.
    pub fn replace_json(&self, payload: Value) -> ReplaceOutcome {
        match Snapshot::from_json(payload) {
            Some(snapshot) => self.replace(snapshot),
            None => {
                debug!("ignoring malformed incident payload");
                ReplaceOutcome::Ignored
            }
        }
    }
}
