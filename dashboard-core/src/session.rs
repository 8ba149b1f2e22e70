use crate::backend::{Backend, HttpBackend};
use crate::config::DashboardConfig;
use crate::detail::DetailViewer;
use crate::error::BackendError;
use crate::fix_workflow::FixWorkflow;
use crate::metrics::{DerivedMetrics, MetricsCache};
use crate::modal::ModalGuard;
use crate::report::Reporter;
use crate::store::{IncidentStore, StoreState};
use crate::sync_loop::{Refresher, SyncLoop};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Everything one active dashboard view owns, from mount to unmount.
pub struct DashboardSession {
    config: DashboardConfig,
    store: IncidentStore,
    modals: Arc<ModalGuard>,
    detail: Arc<DetailViewer>,
    fix: Arc<FixWorkflow>,
    metrics: Mutex<MetricsCache>,
    token: CancellationToken,
    sync: SyncLoop,
}

impl DashboardSession {
    /// Wires the components together and starts polling. Needs a tokio
    /// runtime.
    pub fn mount(
        config: DashboardConfig,
        backend: Arc<dyn Backend>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let store = IncidentStore::new();
        let modals = Arc::new(ModalGuard::new());
        let token = CancellationToken::new();
        let refresher = Refresher::new(backend.clone(), store.clone());

        let detail = Arc::new(DetailViewer::new(modals.clone()));
        let fix = Arc::new(FixWorkflow::new(
            backend,
            reporter,
            modals.clone(),
            refresher.clone(),
            config.refresh_delay,
            token.clone(),
        ));
        let sync = SyncLoop::spawn(
            refresher,
            modals.clone(),
            config.poll_interval,
            token.child_token(),
        );
        info!(base_url = %config.base_url, "dashboard session mounted");

        Self {
            metrics: Mutex::new(MetricsCache::new(config.ai_source_marker.clone())),
            config,
            store,
            modals,
            detail,
            fix,
            token,
            sync,
        }
    }

    /// Mounts against the HTTP backend named in `config`.
    pub fn mount_http(
        config: DashboardConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, BackendError> {
        let backend = Arc::new(HttpBackend::new(&config)?);
        Ok(Self::mount(config, backend, reporter))
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn store(&self) -> &IncidentStore {
        &self.store
    }

    pub fn current(&self) -> StoreState {
        self.store.current()
    }

    pub fn detail(&self) -> &Arc<DetailViewer> {
        &self.detail
    }

    pub fn fix(&self) -> &Arc<FixWorkflow> {
        &self.fix
    }

    pub fn polling_suspended(&self) -> bool {
        self.modals.polling_suspended()
    }

    /// Metrics for the current snapshot, recomputed only when it changed.
    pub fn metrics(&self) -> DerivedMetrics {
        let snapshot = self.store.current().snapshot;
        self.metrics.lock().get(&snapshot).clone()
    }

    /// Stops polling, drops any scheduled refresh and abandons an open fix.
    /// Tasks still holding the session see an idle workflow; results of
    /// requests they have in flight are ignored.
    pub async fn unmount(&self) {
        self.token.cancel();
        self.fix.reset();
        self.detail.close();
        self.sync.shutdown().await;
        info!("dashboard session unmounted");
    }
}
