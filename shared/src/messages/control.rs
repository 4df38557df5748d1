//! Worker control-plane payloads
//!
//! JSON bodies served by every worker's control server and consumed by the
//! orchestrator's worker client. Field names are part of the wire contract.

use serde::{Deserialize, Serialize};

use crate::types::{FailureFlags, FailureKind};

/// Reported worker status; workers never report anything but `healthy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// `GET /health` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub failures: FailureFlags,
    pub pid: u32,
    pub name: String,
}

/// `GET /status` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub worker_name: String,
    pub pid: u32,
    pub failure_state: FailureFlags,
    #[serde(default)]
    pub ballast_bytes: u64,
    #[serde(default)]
    pub iterations: u64,
}

/// `POST /inject-failure` request body
///
/// `kind` stays a raw string so that unrecognized types reach the handler and
/// get the dedicated rejection instead of a generic parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl InjectRequest {
    pub fn new(kind: FailureKind) -> Self {
        Self { kind: kind.as_str().to_string() }
    }
}

/// `POST /inject-failure` response body, success and failure alike
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<String>,
}

/// `POST /clear-failures` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}
