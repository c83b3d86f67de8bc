pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/inputs",
            put(handlers::handle_set_inputs),
        )
        .route(
            "/api/v1/sessions/:id/documents",
            post(handlers::handle_upload_documents),
        )
        .route("/api/v1/sessions/:id/start", post(handlers::handle_start))
        .route(
            "/api/v1/sessions/:id/previous",
            post(handlers::handle_previous),
        )
        .route("/api/v1/sessions/:id/next", post(handlers::handle_next))
        .route("/api/v1/sessions/:id/finish", post(handlers::handle_finish))
        .route(
            "/api/v1/sessions/:id/results",
            get(handlers::handle_results),
        )
        .route("/api/v1/sessions/:id/save", post(handlers::handle_save))
        // Saved results
        .route(
            "/api/v1/results/:filename",
            get(handlers::handle_get_saved_result),
        )
        .with_state(state)
}
