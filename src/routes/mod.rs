//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API the editor front end talks to. Every
//! endpoint is a thin translation over `services`; the canvas engine itself
//! runs client-side and only reaches the server through these routes.

pub mod projects;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/templates", get(projects::list_templates))
        .route("/api/projects", get(projects::list_projects).post(projects::create_project))
        .route(
            "/api/projects/{id}",
            get(projects::get_project)
                .put(projects::save_project)
                .delete(projects::delete_project),
        )
        .route(
            "/api/projects/{id}/versions",
            get(projects::list_versions).post(projects::create_version),
        )
        .route(
            "/api/projects/{id}/versions/{version}/restore",
            post(projects::restore_version),
        )
        .route(
            "/api/projects/{id}/generate",
            get(projects::generation_status).post(projects::generate),
        )
        .route("/api/projects/{id}/export.json", get(projects::export_json))
        .route("/api/projects/{id}/scene", get(projects::scene))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
