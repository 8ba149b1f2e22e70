use crate::incidents::Incident;
use crate::modal::ModalGuard;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Read-only inspection view over one selected incident.
pub struct DetailViewer {
    modals: Arc<ModalGuard>,
    selected: Mutex<Option<Incident>>,
}

impl DetailViewer {
    pub fn new(modals: Arc<ModalGuard>) -> Self {
        Self {
            modals,
            selected: Mutex::new(None),
        }
    }

    /// Opening with no incident does nothing.
    pub fn open(&self, incident: Option<Incident>) {
        let Some(incident) = incident else {
            return;
        };
        *self.selected.lock() = Some(incident);
        self.modals.set_detail_open(true);
        debug!("detail view opened");
    }

    /// The last selection is kept after closing.
    pub fn close(&self) {
        self.modals.set_detail_open(false);
        debug!("detail view closed");
    }

    pub fn is_open(&self) -> bool {
        self.modals.detail_open()
    }

    pub fn selected(&self) -> Option<Incident> {
        self.selected.lock().clone()
    }

    /// Pretty-printed record of the selected incident.
    pub fn detail_json(&self) -> Option<String> {
        let selected = self.selected.lock();
        selected
            .as_ref()
            .and_then(|incident| serde_json::to_string_pretty(incident).ok())
    }
}
