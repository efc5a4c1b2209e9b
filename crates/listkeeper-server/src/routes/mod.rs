pub mod form;
pub mod health;
pub mod lists;

use std::sync::Arc;

use axum::{http::StatusCode, Json, Router};
use listkeeper_service::{ListService, ServiceError};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::error;

pub struct InnerAppState {
    pub service: Arc<dyn ListService>,
}

pub type AppState = Arc<InnerAppState>;

pub type ApiError = (StatusCode, Json<Value>);

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(lists::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": msg.into() })),
    )
}

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::BadParamInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Internal(_) => {
            error!(error = %e, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": e.to_string() })))
}
