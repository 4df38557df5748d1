//! Orchestrator library for supervising a fleet of fault-injection workers
//!
//! Spawns worker processes, polls their health, relays operator commands to
//! their control planes and tears the fleet down on exit.

pub mod core;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use core::{Command, ShutdownTrigger};
pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::{validate_specs, Flow, Orchestrator};
pub use services::{RealProcessManager, RealWorkerClient};
pub use traits::{ProcessManager, WorkerClient};
pub use types::{
    ClientConfig, ExitedWorker, HealthClass, OrchestratorConfig, ProcessState, SpawnConfig, StopSummary,
    WorkerHealth, WorkerInfo, WorkerProcessStatus,
};
