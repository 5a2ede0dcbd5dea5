pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::tagging::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tagging API
        .route("/api/v1/tags/extract", post(handlers::handle_extract))
        .route("/api/v1/models", get(handlers::handle_list_models))
        // Dictionary API
        .route(
            "/api/v1/dictionary/stats",
            get(handlers::handle_dictionary_stats),
        )
        .route(
            "/api/v1/dictionary/reload",
            post(handlers::handle_dictionary_reload),
        )
        .with_state(state)
}
