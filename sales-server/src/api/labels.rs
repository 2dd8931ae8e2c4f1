//! Label endpoints

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router, middleware};
use shared::models::{Label, LabelCreate, LabelUpdate};

use super::ApiResult;
use crate::auth::require_permission;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let read = Router::new()
        .route("/api/labels", get(list))
        .route("/api/labels/{id}", get(get_one))
        .route_layer(middleware::from_fn(require_permission("products:read")));

    let write = Router::new()
        .route("/api/labels", post(create))
        .route("/api/labels/{id}", put(update))
        .route("/api/labels/{id}", delete(delete_one))
        .route_layer(middleware::from_fn(require_permission("products:write")));

    read.merge(write)
}

async fn list(State(state): State<AppState>) -> ApiResult<Vec<Label>> {
    Ok(Json(db::labels::list_labels(&state.pool).await?))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Label> {
    Ok(Json(db::labels::get_label(&state.pool, id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(data): Json<LabelCreate>,
) -> ApiResult<Label> {
    Ok(Json(db::labels::create_label(&state.pool, &data.name).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<LabelUpdate>,
) -> ApiResult<Label> {
    Ok(Json(db::labels::update_label(&state.pool, id, &data.name).await?))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::labels::delete_label(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
