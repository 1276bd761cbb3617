use axum::body::to_bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::Json;
use canvas::doc::{Audience, ModelError, NodeKind, ProjectStatus};

use super::*;
use crate::agent::AgentError;
use crate::services::store::StoreError;
use crate::state::test_helpers::{dummy_project, seed_project, test_app_state};

// =========================================================================
// error mapping
// =========================================================================

#[test]
fn project_error_to_status_maps_each_variant() {
    assert_eq!(project_error_to_status(ProjectError::NotFound("x".into())), StatusCode::NOT_FOUND);
    assert_eq!(
        project_error_to_status(ProjectError::Invalid(ModelError::VersionNotFound(1))),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    let decode = serde_json::from_str::<i32>("nope").unwrap_err();
    assert_eq!(
        project_error_to_status(ProjectError::Store(StoreError::Decode(decode))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn generate_error_to_status_maps_each_variant() {
    let cases = [
        (GenerateError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (GenerateError::EmptyRequirements, StatusCode::BAD_REQUEST),
        (GenerateError::AlreadyGenerating, StatusCode::CONFLICT),
        (GenerateError::AgentUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        (GenerateError::AgentFailed(AgentError::Request("down".into())), StatusCode::BAD_GATEWAY),
        (
            GenerateError::Project(ProjectError::Invalid(ModelError::VersionNotFound(2))),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
    ];
    for (err, expected) in cases {
        assert_eq!(generate_error_to_status(err), expected);
    }
}

#[test]
fn export_filename_slugs_names() {
    assert_eq!(export_filename("Online Book Store!"), "online-book-store.json");
    assert_eq!(export_filename("  "), "project.json");
    assert_eq!(export_filename("API v2 / Edge"), "api-v2-edge.json");
}

// =========================================================================
// handlers
// =========================================================================

#[tokio::test]
async fn templates_lists_catalog() {
    let Json(templates) = list_templates().await;
    assert!(templates.iter().any(|t| t.kind == NodeKind::Database));
}

#[tokio::test]
async fn create_then_get_round_trips_through_store() {
    let state = test_app_state();
    let body = CreateProjectBody { name: "Shop".into(), requirements: "sell books".into(), audience: Audience::Executive };
    let (status, Json(created)) = create_project(State(state.clone()), Json(body)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.status, ProjectStatus::Draft);

    let Json(loaded) = get_project(State(state.clone()), Path(created.id.clone())).await.unwrap();
    assert_eq!(loaded.name, "Shop");

    let Json(all) = list_projects(State(state)).await;
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn create_body_defaults_optional_fields() {
    let body: CreateProjectBody = serde_json::from_str(r#"{"name":"Only name"}"#).unwrap();
    assert!(body.requirements.is_empty());
    assert_eq!(body.audience, Audience::default());
}

#[tokio::test]
async fn get_missing_project_is_404() {
    let err = get_project(State(test_app_state()), Path("missing".into())).await.unwrap_err();
    assert_eq!(err, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_uses_path_id_over_body_id() {
    let state = test_app_state();
    let id = seed_project(&state, &dummy_project("reqs")).await;
    let mut body = dummy_project("reqs");
    body.name = "From PUT".into();

    let Json(saved) = save_project(State(state.clone()), Path(id.clone()), Json(body)).await.unwrap();
    assert_eq!(saved.id, id);
    let Json(loaded) = get_project(State(state), Path(id)).await.unwrap();
    assert_eq!(loaded.name, "From PUT");
}

#[tokio::test]
async fn put_invalid_model_is_422() {
    let state = test_app_state();
    let mut body = dummy_project("reqs");
    let dup = body.nodes[0].id.clone();
    body.nodes[1].id = dup;
    let err = save_project(State(state), Path("p1".into()), Json(body)).await.unwrap_err();
    assert_eq!(err, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_is_204_and_idempotent() {
    let state = test_app_state();
    let id = seed_project(&state, &dummy_project("")).await;
    assert_eq!(delete_project(State(state.clone()), Path(id.clone())).await, Ok(StatusCode::NO_CONTENT));
    assert_eq!(delete_project(State(state.clone()), Path(id.clone())).await, Ok(StatusCode::NO_CONTENT));
    assert_eq!(get_project(State(state), Path(id)).await.unwrap_err(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn versions_create_list_and_restore() {
    let state = test_app_state();
    let id = seed_project(&state, &dummy_project("")).await;

    let body = Some(Json(CreateVersionBody { name: Some("baseline".into()) }));
    let (status, Json(version)) = create_version(State(state.clone()), Path(id.clone()), body).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(version.version, 1);

    let (_, Json(second)) = create_version(State(state.clone()), Path(id.clone()), None).await.unwrap();
    assert_eq!(second.version, 2);
    assert!(second.snapshot_name.is_none());

    let Json(versions) = list_versions(State(state.clone()), Path(id.clone())).await.unwrap();
    assert_eq!(versions.len(), 2);

    let Json(restored) = restore_version(State(state), Path((id, 1))).await.unwrap();
    assert_eq!(restored.nodes.len(), 2);
}

#[tokio::test]
async fn restore_unknown_version_is_404() {
    let state = test_app_state();
    let id = seed_project(&state, &dummy_project("")).await;
    let err = restore_version(State(state), Path((id, 9))).await.unwrap_err();
    assert_eq!(err, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_without_agent_is_503() {
    let state = test_app_state();
    let id = seed_project(&state, &dummy_project("reqs")).await;
    let err = generate(State(state), Path(id)).await.unwrap_err();
    assert_eq!(err, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn generate_blank_requirements_is_400() {
    let state = test_app_state();
    let id = seed_project(&state, &dummy_project(" ")).await;
    let err = generate(State(state), Path(id)).await.unwrap_err();
    assert_eq!(err, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generation_status_reflects_in_flight_guard() {
    let state = test_app_state();
    let id = seed_project(&state, &dummy_project("reqs")).await;

    let Json(idle) = generation_status(State(state.clone()), Path(id.clone())).await.unwrap();
    assert!(!idle.generating);

    let _guard = state.try_begin_generation(&id).unwrap();
    let Json(busy) = generation_status(State(state.clone()), Path(id.clone())).await.unwrap();
    assert!(busy.generating);

    let err = generate(State(state), Path(id)).await.unwrap_err();
    assert_eq!(err, StatusCode::CONFLICT);
}

#[tokio::test]
async fn generation_status_of_missing_project_is_404() {
    let err = generation_status(State(test_app_state()), Path("missing".into())).await.unwrap_err();
    assert_eq!(err, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_is_json_attachment() {
    let state = test_app_state();
    let project = dummy_project("reqs");
    let id = seed_project(&state, &project).await;

    let response = export_json(State(state), Path(id)).await.unwrap();
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json; charset=utf-8");
    assert_eq!(response.headers()[CONTENT_DISPOSITION], "attachment; filename=\"test-project.json\"");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let exported: canvas::doc::Project = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(exported, project);
}

#[tokio::test]
async fn scene_draws_every_node_and_edge() {
    let state = test_app_state();
    let id = seed_project(&state, &dummy_project("")).await;
    let Json(drawn) = scene(State(state), Path(id)).await.unwrap();
    assert_eq!(drawn.nodes.len(), 2);
    assert_eq!(drawn.edges.len(), 1);
    assert!(drawn.bounds().is_some());
}
