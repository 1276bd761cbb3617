//! Project, version, generation and export routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use canvas::camera::Camera;
use canvas::doc::{Audience, ModelError, Project, ProjectVersion};
use canvas::render::{Scene, build_scene};
use canvas::template::{ComponentTemplate, default_templates};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::generate::{self, GenerateError};
use crate::services::project::{self, ProjectError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateProjectBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub audience: Audience,
}

#[derive(Deserialize)]
pub struct CreateVersionBody {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub project: Project,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerationStatus {
    pub generating: bool,
}

pub(crate) fn project_error_to_status(err: ProjectError) -> StatusCode {
    match err {
        ProjectError::NotFound(_) => StatusCode::NOT_FOUND,
        ProjectError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ProjectError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn generate_error_to_status(err: GenerateError) -> StatusCode {
    match err {
        GenerateError::NotFound(_) => StatusCode::NOT_FOUND,
        GenerateError::EmptyRequirements => StatusCode::BAD_REQUEST,
        GenerateError::AlreadyGenerating => StatusCode::CONFLICT,
        GenerateError::AgentUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        GenerateError::AgentFailed(_) => StatusCode::BAD_GATEWAY,
        GenerateError::Project(e) => project_error_to_status(e),
    }
}

/// `GET /api/templates`: The component catalog.
pub async fn list_templates() -> Json<Vec<ComponentTemplate>> {
    Json(default_templates())
}

/// `GET /api/projects`: Every project, newest first.
pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(project::list_projects(state.store.as_ref()).await)
}

/// `POST /api/projects`: Create an empty draft.
pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> Result<(StatusCode, Json<Project>), StatusCode> {
    let created = project::create_project(state.store.as_ref(), &body.name, &body.requirements, body.audience)
        .await
        .map_err(project_error_to_status)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/projects/:id`
pub async fn get_project(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Project>, StatusCode> {
    project::get_project(state.store.as_ref(), &id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// `PUT /api/projects/:id`: Whole-project save. The path id wins over the body.
pub async fn save_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut body): Json<Project>,
) -> Result<Json<Project>, StatusCode> {
    if body.id != id {
        warn!(path_id = %id, body_id = %body.id, "project id mismatch; using path id");
        body.id = id;
    }
    project::save_project(state.store.as_ref(), body)
        .await
        .map(Json)
        .map_err(project_error_to_status)
}

/// `DELETE /api/projects/:id`: Idempotent.
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, StatusCode> {
    project::delete_project(state.store.as_ref(), &id)
        .await
        .map_err(project_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/projects/:id/versions`
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProjectVersion>>, StatusCode> {
    project::list_versions(state.store.as_ref(), &id)
        .await
        .map(Json)
        .map_err(project_error_to_status)
}

/// `POST /api/projects/:id/versions`: Snapshot the live diagram.
pub async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<CreateVersionBody>>,
) -> Result<(StatusCode, Json<ProjectVersion>), StatusCode> {
    let name = body.and_then(|Json(body)| body.name);
    let version = project::create_version(state.store.as_ref(), &id, name)
        .await
        .map_err(project_error_to_status)?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// `POST /api/projects/:id/versions/:version/restore`
pub async fn restore_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, u32)>,
) -> Result<Json<Project>, StatusCode> {
    project::restore_version(state.store.as_ref(), &id, version)
        .await
        .map(Json)
        .map_err(|e| match e {
            ProjectError::Invalid(ModelError::VersionNotFound(_)) => StatusCode::NOT_FOUND,
            other => project_error_to_status(other),
        })
}

/// `POST /api/projects/:id/generate`: Run the generation workflow.
pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GenerateResponse>, StatusCode> {
    let generation = generate::generate_diagram(&state, &id)
        .await
        .map_err(generate_error_to_status)?;
    Ok(Json(GenerateResponse { project: generation.project, suggestions: generation.suggestions }))
}

/// `GET /api/projects/:id/generate`: Whether a generation is in flight, so the
/// editor can disable its trigger.
pub async fn generation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GenerationStatus>, StatusCode> {
    project::require_project(state.store.as_ref(), &id)
        .await
        .map_err(project_error_to_status)?;
    Ok(Json(GenerationStatus { generating: state.is_generating(&id) }))
}

/// `GET /api/projects/:id/export.json`: The stored project as a download.
pub async fn export_json(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, StatusCode> {
    let project = project::require_project(state.store.as_ref(), &id)
        .await
        .map_err(project_error_to_status)?;
    let body = serde_json::to_string_pretty(&project).map_err(|e| {
        warn!(project_id = %id, error = %e, "project export serialization failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let filename = export_filename(&project.name);
    Ok((
        [
            (CONTENT_TYPE, "application/json; charset=utf-8"),
            (CONTENT_DISPOSITION, &format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response())
}

/// `GET /api/projects/:id/scene`: Draw list in canvas coordinates.
pub async fn scene(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Scene>, StatusCode> {
    let project = project::require_project(state.store.as_ref(), &id)
        .await
        .map_err(project_error_to_status)?;
    Ok(Json(build_scene(&project, &Camera::default())))
}

/// Reduce a project name to a safe download filename.
fn export_filename(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() { "project.json".to_owned() } else { format!("{slug}.json") }
}

#[cfg(test)]
#[path = "projects_test.rs"]
mod tests;
