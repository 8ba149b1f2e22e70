//! Client-side state engine for the incident dashboard: keeps an incident
//! snapshot fresh and drives the human-approved fix workflow.

pub mod backend;
pub mod config;
pub mod detail;
pub mod error;
pub mod fix_workflow;
pub mod incidents;
pub mod metrics;
pub mod modal;
pub mod report;
pub mod risk;
pub mod session;
pub mod store;
pub mod sync_loop;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Backend, ExecutionResult, FixProposal, HttpBackend};
pub use config::DashboardConfig;
pub use detail::DetailViewer;
pub use error::{BackendError, FixError};
pub use fix_workflow::{ExecutionReport, FixState, FixWorkflow, PendingFix};
pub use incidents::{Incident, Snapshot};
pub use metrics::{ai_ratio, DerivedMetrics};
pub use report::{LogReporter, ReportKind, Reporter};
pub use risk::RiskLevel;
pub use session::DashboardSession;
pub use store::{IncidentStore, StoreState};
