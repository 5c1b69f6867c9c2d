use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use campus_core::{ActiveFilter, ServiceError};

use crate::api::AppState;
use crate::model::{Batch, CreateBatch, UpdateBatch};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/batches", post(create_batch))
        .route(
            "/batches/{id}",
            get(get_batch).patch(update_batch).delete(delete_batch),
        )
        .route("/batches/{id}/children", get(list_children))
        .route("/batches/{id}/ancestors", get(list_ancestors))
        .route("/batches/tree/{root_id}", get(get_tree))
}

async fn create_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateBatch>,
) -> Result<(StatusCode, Json<Batch>), ServiceError> {
    let principal = state.principals.resolve(&headers)?;
    let batch = state.service.create_batch(&principal, input)?;
    Ok((StatusCode::CREATED, Json(batch)))
}

async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Json<Batch>, ServiceError> {
    let batch = state.service.get_batch(&id, filter.include_inactive)?;
    Ok(Json(batch))
}

async fn update_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<UpdateBatch>,
) -> Result<Json<Batch>, ServiceError> {
    let principal = state.principals.resolve(&headers)?;
    let batch = state.service.update_batch(&principal, &id, patch)?;
    Ok(Json(batch))
}

async fn delete_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let principal = state.principals.resolve(&headers)?;
    state.service.delete_batch(&principal, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = state
        .service
        .get_direct_children(&id, filter.include_inactive)?;
    Ok(Json(serde_json::json!({ "items": items })))
}

async fn list_ancestors(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = state.service.get_ancestors(&id)?;
    Ok(Json(serde_json::json!({ "items": items })))
}

async fn get_tree(
    State(state): State<AppState>,
    Path(root_id): Path<String>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Response, ServiceError> {
    let tree = state.service.get_tree(&root_id, filter.include_inactive)?;
    let body = tree
        .to_json()
        .map_err(|e| ServiceError::Internal(format!("encode batch tree: {}", e)))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
