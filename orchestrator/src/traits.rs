//! Trait definitions with mockall annotations for testing
//!
//! The orchestrator talks to the outside world through two seams: the child
//! processes it owns and the HTTP control plane each child serves.

use std::time::Duration;

use shared::{ClearResponse, FailureKind, HealthReport, InjectResponse, WorkerSpec};

use crate::error::OrchestratorResult;
use crate::types::{ExitedWorker, StopSummary, WorkerInfo, WorkerProcessStatus};

/// Child process management
///
/// Spawns worker processes, tracks their liveness and tears them down.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ProcessManager: Send + Sync {
    /// Launch one worker process for `spec`
    ///
    /// # Returns
    /// Addressing record with the child's PID
    async fn spawn_worker(&self, spec: &WorkerSpec) -> OrchestratorResult<WorkerInfo>;

    /// Children that exited since the last call
    ///
    /// Each exit is reported once.
    async fn reap_exited(&self) -> Vec<ExitedWorker>;

    /// Liveness of every child spawned so far
    async fn process_status(&self) -> Vec<WorkerProcessStatus>;

    /// SIGTERM every live child, wait up to `grace`, then SIGKILL and reap
    async fn stop_all(&self, grace: Duration) -> StopSummary;
}

/// Worker control-plane client
///
/// Every call is independently fallible and bounded by the client timeout.
#[mockall::automock]
#[async_trait::async_trait]
pub trait WorkerClient: Send + Sync {
    /// `GET /health`
    async fn health(&self, worker: &WorkerInfo) -> OrchestratorResult<HealthReport>;

    /// `POST /inject-failure` with `{"type": kind}`
    async fn inject_failure(&self, worker: &WorkerInfo, kind: FailureKind) -> OrchestratorResult<InjectResponse>;

    /// `POST /clear-failures`
    async fn clear_failures(&self, worker: &WorkerInfo) -> OrchestratorResult<ClearResponse>;
}
