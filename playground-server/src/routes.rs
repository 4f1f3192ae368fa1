//! HTTP route handlers for the evaluator and the example catalog.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Endpoints consumed by the playground client.
pub fn playground_router() -> Router<AppState> {
    Router::new()
        .route("/eval", post(eval))
        .route("/examples", get(examples))
}

/// Operational endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}

/// POST /eval - run the raw body through the evaluator.
///
/// Evaluator failures are still `200`; only failing to run the evaluator at
/// all is a server error.
async fn eval(State(state): State<AppState>, body: String) -> Result<Json<Value>, StatusCode> {
    info!(bytes = body.len(), "eval");
    debug!(source = %body, "eval source");

    let evaluator = Arc::clone(&state.evaluator);
    let reply = tokio::task::spawn_blocking(move || evaluator.evaluate(&body))
        .await
        .map_err(|err| {
            warn!(error = %err, "evaluator task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|err| {
            warn!(error = %format!("{err:#}"), "evaluator could not run");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(reply.to_json()))
}

/// GET /examples - the cached catalog.
async fn examples(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.examples_json.to_string(),
    )
}
