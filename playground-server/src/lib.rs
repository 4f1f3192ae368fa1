//! HTTP server hosting the playground's evaluation and example endpoints.

pub mod evaluator;
pub mod examples;
pub mod routes;
pub mod state;

use std::path::Path;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::state::AppState;

/// Build the application router.
///
/// Static UI files are served from `ui_dir` when it exists; otherwise the
/// server runs API-only.
pub fn app(state: AppState, ui_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .merge(routes::playground_router())
        .nest("/api", routes::api_router())
        .layer(cors)
        .with_state(state);

    match ui_dir {
        Some(dir) if dir.exists() => {
            info!(ui_dir = %dir.display(), "serving static UI files");
            app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        }
        Some(dir) => info!(ui_dir = %dir.display(), "UI directory not found, API-only mode"),
        None => info!("no UI directory configured, API-only mode"),
    }
    app
}
