use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::form::ListForm;
use super::{bad_request, to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/lists", get(fetch_lists).post(store_list))
        .route(
            "/api/lists/{id}",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route(
            "/api/lists/{parent_id}/sublists",
            get(fetch_sublists).post(store_sublist),
        )
        .route(
            "/api/lists/{parent_id}/sublists/{id}",
            get(get_sublist).put(update_sublist).delete(delete_sublist),
        )
}

fn parse_id(name: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| bad_request(format!("{name} must be an integer, got {raw:?}")))
}

fn deleted() -> Json<Value> {
    Json(json!({ "message": "deleted" }))
}

// -- Lists --

async fn fetch_lists(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.service.fetch().await
        .map(|l| Json(json!(l)))
        .map_err(to_error)
}

async fn get_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id("id", &id)?;
    state.service.get_by_id(id).await
        .map(|l| Json(json!(l)))
        .map_err(to_error)
}

async fn store_list(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (input, upload) = ListForm::read(multipart).await?.into_create();
    state.service.store(input, upload).await
        .map(|l| (StatusCode::CREATED, Json(json!(l))))
        .map_err(to_error)
}

async fn update_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id("id", &id)?;
    let (update, upload) = ListForm::read(multipart).await?.into_update();
    state.service.update(id, update, upload).await
        .map(|l| Json(json!(l)))
        .map_err(to_error)
}

async fn delete_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id("id", &id)?;
    state.service.delete(id).await
        .map(|_| deleted())
        .map_err(to_error)
}

// -- Sublists --

async fn fetch_sublists(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let parent_id = parse_id("parent_id", &parent_id)?;
    state.service.fetch_sublist(parent_id).await
        .map(|l| Json(json!(l)))
        .map_err(to_error)
}

async fn get_sublist(
    State(state): State<AppState>,
    Path((parent_id, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let parent_id = parse_id("parent_id", &parent_id)?;
    let id = parse_id("id", &id)?;
    state.service.get_sublist_by_id(parent_id, id).await
        .map(|l| Json(json!(l)))
        .map_err(to_error)
}

async fn store_sublist(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let parent_id = parse_id("parent_id", &parent_id)?;
    let (input, upload) = ListForm::read(multipart).await?.into_create();
    state.service.store_sublist(parent_id, input, upload).await
        .map(|l| Json(json!(l)))
        .map_err(to_error)
}

async fn update_sublist(
    State(state): State<AppState>,
    Path((parent_id, id)): Path<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let parent_id = parse_id("parent_id", &parent_id)?;
    let id = parse_id("id", &id)?;
    let (update, upload) = ListForm::read(multipart).await?.into_update();
    state.service.update_sublist(parent_id, id, update, upload).await
        .map(|l| Json(json!(l)))
        .map_err(to_error)
}

async fn delete_sublist(
    State(state): State<AppState>,
    Path((parent_id, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let parent_id = parse_id("parent_id", &parent_id)?;
    let id = parse_id("id", &id)?;
    state.service.delete_sublist(parent_id, id).await
        .map(|_| deleted())
        .map_err(to_error)
}
