//! HTTP surface — thin JSON glue over the workflow.
//!
//! Handlers deserialize, delegate, and map errors to status codes. Input
//! validation and control flow live in the workflow module, which rejects
//! bad input before any completion call.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::error::WorkflowError;
use crate::workflow::orchestrator::EmailWorkflow;
use crate::workflow::refiner::Refiner;
use crate::workflow::types::{EmailRecord, RefinementRequest};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<EmailWorkflow>,
    pub refiner: Arc<Refiner>,
}

/// Build the Axum router for the email assistant API.
///
/// CORS is permissive — the UI is served from another origin.
pub fn email_routes(workflow: Arc<EmailWorkflow>, refiner: Arc<Refiner>) -> Router {
    let state = AppState { workflow, refiner };

    Router::new()
        .route("/api/health", get(health))
        .route("/api/email-assistant/process", post(process_email))
        .route("/api/email-assistant/refine", post(refine_reply))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "email-assist"
    }))
}

async fn process_email(
    State(state): State<AppState>,
    Json(email): Json<EmailRecord>,
) -> impl IntoResponse {
    match state.workflow.run(&email).await {
        Ok(result) => (StatusCode::OK, Json(serde_json::json!(result))),
        Err(e) => error_response(e),
    }
}

async fn refine_reply(
    State(state): State<AppState>,
    Json(request): Json<RefinementRequest>,
) -> impl IntoResponse {
    match state.refiner.refine(&request).await {
        Ok(result) => (StatusCode::OK, Json(serde_json::json!(result))),
        Err(e) => error_response(e),
    }
}

/// Map workflow errors onto HTTP statuses.
///
/// Completion failures are deliberately generic: the caller learns the run
/// failed and nothing else, and no partial result crosses the wire.
fn error_response(err: WorkflowError) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        WorkflowError::InvalidInput { field, problem } => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": format!("{field} {problem}") })),
        ),
        WorkflowError::Completion(e) => {
            error!(error = %e, "Completion service failure");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "email processing failed" })),
            )
        }
    }
}
