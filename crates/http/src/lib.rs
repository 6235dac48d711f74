//! HTTP API server for EduMate.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
pub mod auth;
mod handlers;
mod request_types;
mod response_types;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{Json, Router, middleware};
use edumate_core::constants::MAX_UPLOAD_BYTES;
use edumate_service::Services;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use response_types::{HealthResponse, VersionResponse};

/// Room for multipart boundaries and form fields around a maximum-size file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub services: Services,
    /// Expected `X-API-Key` value. `None` leaves the API open.
    pub api_key: Option<String>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/sessions", post(handlers::sessions::create_session).get(handlers::sessions::list_sessions))
        .route(
            "/sessions/{id}",
            get(handlers::sessions::get_session)
                .patch(handlers::sessions::rename_session)
                .delete(handlers::sessions::delete_session),
        )
        .route("/sources/{id}", get(handlers::sessions::get_sources))
        .route("/process/document", post(handlers::ingest::process_document))
        .route("/process/url", post(handlers::ingest::process_url))
        .route("/chat", post(handlers::chat::chat))
        .route("/curriculum", post(handlers::curriculum::generate_curriculum))
        .route(
            "/curriculum/{id}",
            get(handlers::curriculum::get_curriculum).put(handlers::curriculum::modify_curriculum),
        )
        .route("/curriculum/{id}/details", post(handlers::curriculum::generate_details))
        .route("/curriculum/{id}/details/{step}", get(handlers::curriculum::get_step_detail))
        .route("/curriculum/{id}/roadmap", get(handlers::curriculum::get_roadmap))
        .route(
            "/curriculums",
            get(handlers::curriculum::list_curriculums).post(handlers::curriculum::create_curriculum),
        )
        .route(
            "/curriculums/{id}",
            get(handlers::curriculum::get_curriculum).delete(handlers::curriculum::delete_curriculum),
        )
        .route("/class/grade-submission/{assignment_id}", post(handlers::grading::grade_submission))
        .route("/class/updateScore/{submission_id}", put(handlers::grading::update_score))
        .route("/class/submissions/{submission_id}/grading", get(handlers::grading::get_grading))
        .route("/class/assignments/{assignment_id}/submissions", get(handlers::grading::list_submissions))
        .route_layer(middleware::from_fn_with_state(Arc::clone(&state), auth::require_api_key));

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .merge(api)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
