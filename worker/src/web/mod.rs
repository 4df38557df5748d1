//! HTTP control plane
//!
//! Routes every worker serves on its assigned port.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::WorkerContext;
use handlers::control;

/// Build the control-plane router over the shared worker context
///
/// Known paths hit with the wrong method fall through to 404 like unknown
/// paths do.
pub fn router(context: Arc<WorkerContext>) -> Router {
    Router::new()
        .route("/health", get(control::get_health).fallback(control::not_found))
        .route("/status", get(control::get_status).fallback(control::not_found))
        .route(
            "/inject-failure",
            post(control::inject_failure).fallback(control::not_found),
        )
        .route(
            "/clear-failures",
            post(control::clear_failures).fallback(control::not_found),
        )
        .fallback(control::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}
