//! Shared types for the fault-injection worker fleet
//!
//! Contains the failure-mode vocabulary, the worker control-plane payloads and
//! the logging setup used by both the orchestrator and the workers.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod signals;
pub mod types;

pub use errors::*;
pub use types::*;

pub use messages::{
    ClearResponse, HealthReport, HealthStatus, InjectRequest, InjectResponse, StatusReport,
};
