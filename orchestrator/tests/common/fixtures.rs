//! Test fixtures and data for orchestrator tests

use shared::{ClearResponse, FailureFlags, FailureKind, HealthReport, HealthStatus, InjectResponse, WorkerSpec};

use ::orchestrator::WorkerInfo;

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const WORKER_1: &'static str = "worker1";
    pub const WORKER_2: &'static str = "worker2";
    pub const WORKER_3: &'static str = "worker3";

    /// PIDs handed out by the mocked process manager
    pub const BASE_PID: u32 = 4000;

    /// The standard three-worker fleet
    pub fn specs() -> Vec<WorkerSpec> {
        WorkerSpec::default_fleet()
    }

    pub fn spec(name: &str, port: u16) -> WorkerSpec {
        WorkerSpec::new(name, port)
    }

    /// Addressing record the mocked process manager returns for `spec`
    pub fn info_for(spec: &WorkerSpec) -> WorkerInfo {
        WorkerInfo {
            name: spec.name.clone(),
            port: spec.port,
            pid: Self::BASE_PID + u32::from(spec.port % 1000),
        }
    }

    pub fn health(name: &str, pid: u32, failures: FailureFlags) -> HealthReport {
        HealthReport {
            status: HealthStatus::Healthy,
            failures,
            pid,
            name: name.to_string(),
        }
    }

    pub fn injected(name: &str, kind: FailureKind) -> InjectResponse {
        InjectResponse {
            success: true,
            message: format!("Injected {kind} failure"),
            worker: Some(name.to_string()),
        }
    }

    pub fn cleared() -> ClearResponse {
        ClearResponse {
            success: true,
            message: "Cleared all failures".to_string(),
        }
    }
}
