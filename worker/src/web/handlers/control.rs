//! Control-plane handlers
//!
//! Health and status reads never touch the run loop; they only snapshot the
//! shared flags. Inject and clear write the flags directly.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use serde_json::Value;

use shared::{
    process_info, process_warn, ClearResponse, FailureKind, HealthReport, HealthStatus, InjectResponse,
    ProcessId, StatusReport,
};

use crate::state::WorkerContext;

/// GET /health
pub async fn get_health(State(context): State<Arc<WorkerContext>>) -> Json<HealthReport> {
    Json(HealthReport {
        status: HealthStatus::Healthy,
        failures: context.failures.snapshot(),
        pid: context.pid(),
        name: context.name().to_string(),
    })
}

/// GET /status
pub async fn get_status(State(context): State<Arc<WorkerContext>>) -> Json<StatusReport> {
    Json(StatusReport {
        worker_name: context.name().to_string(),
        pid: context.pid(),
        failure_state: context.failures.snapshot(),
        ballast_bytes: context.ballast.size_bytes(),
        iterations: context.iterations(),
    })
}

/// POST /inject-failure with `{"type": "<failure kind>"}`
///
/// A body that is not a JSON object is a 500; a missing or unknown type is a
/// 400 and leaves the flags untouched.
pub async fn inject_failure(
    State(context): State<Arc<WorkerContext>>,
    body: Bytes,
) -> (StatusCode, Json<InjectResponse>) {
    let requested = match parse_failure_type(&body) {
        Ok(requested) => requested,
        Err(message) => {
            process_warn!(ProcessId::current(), "⚠️ Rejected inject request: {}", message);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(InjectResponse {
                    success: false,
                    message,
                    worker: None,
                }),
            );
        }
    };

    let Ok(kind) = requested.parse::<FailureKind>() else {
        process_warn!(ProcessId::current(), "⚠️ Invalid failure type requested: '{}'", requested);
        return (
            StatusCode::BAD_REQUEST,
            Json(InjectResponse {
                success: false,
                message: "Invalid failure type".to_string(),
                worker: None,
            }),
        );
    };

    context.failures.set(kind);
    process_info!(ProcessId::current(), "💉 [{}] Injected {} failure", context.name(), kind);

    (
        StatusCode::OK,
        Json(InjectResponse {
            success: true,
            message: format!("Injected {kind} failure"),
            worker: Some(context.name().to_string()),
        }),
    )
}

/// POST /clear-failures
pub async fn clear_failures(State(context): State<Arc<WorkerContext>>) -> Json<ClearResponse> {
    let released = context.clear_failures();
    process_info!(
        ProcessId::current(),
        "🧹 [{}] Cleared all failures, released {} bytes of ballast",
        context.name(),
        released
    );

    Json(ClearResponse {
        success: true,
        message: "Cleared all failures".to_string(),
    })
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Pull the `type` field out of an inject body; non-string values read as ""
fn parse_failure_type(body: &[u8]) -> Result<String, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    let object = value
        .as_object()
        .ok_or_else(|| "Request body must be a JSON object".to_string())?;

    Ok(object
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}
