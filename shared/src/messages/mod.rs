//! Message types exchanged between the orchestrator and its workers
//!
//! - `control`: worker control-plane HTTP payloads (health, status, inject, clear)

pub mod control;

pub use control::{
    ClearResponse, HealthReport, HealthStatus, InjectRequest, InjectResponse, StatusReport,
};
