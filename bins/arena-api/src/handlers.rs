// HTTP route handlers for the Arena API

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use arena_common::query::ListParams;
use arena_common::types::ProblemPayload;
use std::sync::Arc;
use tracing::error;

use crate::error::AuthoringError;
use crate::metrics;
use crate::AppState;

const CREATOR_HEADER: &str = "x-user-id";

fn payload(body: Result<Json<ProblemPayload>, JsonRejection>) -> Result<ProblemPayload, AuthoringError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AuthoringError::MalformedPayload(rejection.body_text()))
}

fn creator(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CREATOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// POST /problems - Validate and create a problem
pub async fn create_problem(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ProblemPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AuthoringError> {
    let payload = payload(body)?;
    let problem = state.service.create(&payload, creator(&headers)).await?;
    Ok((StatusCode::CREATED, Json(problem)))
}

/// GET /problems - Filtered, sorted and paginated catalog
pub async fn list_problems(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AuthoringError> {
    let page = state.service.list(&params).await?;
    Ok(Json(page))
}

/// GET /problems/:id - Full problem document
pub async fn get_problem(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AuthoringError> {
    let problem = state.service.get(&id).await?;
    Ok(Json(problem))
}

/// PATCH /problems/:id - Validate and apply a partial update
pub async fn update_problem(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ProblemPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AuthoringError> {
    let payload = payload(body)?;
    let problem = state.service.update(&id, &payload).await?;
    Ok(Json(problem))
}

/// DELETE /problems/:id
pub async fn delete_problem(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AuthoringError> {
    let problem = state.service.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "problem deleted",
        "id": problem.id,
    })))
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_handler() -> Response {
    match metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}
