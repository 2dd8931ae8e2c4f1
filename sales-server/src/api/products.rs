//! Product endpoints
//!
//! Reads are projected per role: Viewers never receive the `stock` key.

use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post, put};
use axum::{Extension, Json, Router, middleware};
use shared::models::{LabelAttach, ProductCreate, ProductResponse, ProductUpdate};

use super::ApiResult;
use crate::auth::{CurrentUser, require_permission};
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let read = Router::new()
        .route("/api/products", get(list))
        .route("/api/products/{id}", get(get_one))
        .route_layer(middleware::from_fn(require_permission("products:read")));

    let write = Router::new()
        .route("/api/products", post(create))
        .route("/api/products/{id}", put(update).patch(update))
        .route("/api/products/{id}", delete(delete_one))
        .route("/api/products/{id}/labels", post(attach_label))
        .route(
            "/api/products/{id}/labels/{label_id}",
            delete(detach_label),
        )
        .route_layer(middleware::from_fn(require_permission("products:write")));

    read.merge(write)
}

async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<ProductResponse>> {
    let products = db::products::list_products(&state.pool).await?;
    let stock_visible = user.stock_visible();
    Ok(Json(
        products
            .iter()
            .map(|p| p.to_response(stock_visible))
            .collect(),
    ))
}

async fn get_one(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<ProductResponse> {
    let product = db::products::get_product(&state.pool, id).await?;
    Ok(Json(product.to_response(user.stock_visible())))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(data): Json<ProductCreate>,
) -> ApiResult<ProductResponse> {
    let product = db::products::create_product(&state.pool, &data).await?;
    Ok(Json(product.to_response(user.stock_visible())))
}

async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(data): Json<ProductUpdate>,
) -> ApiResult<ProductResponse> {
    let product = db::products::update_product(&state.pool, id, &data).await?;
    Ok(Json(product.to_response(user.stock_visible())))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::products::delete_product(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

async fn attach_label(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(data): Json<LabelAttach>,
) -> ApiResult<ProductResponse> {
    let product = db::products::attach_label(&state.pool, id, &data).await?;
    Ok(Json(product.to_response(user.stock_visible())))
}

async fn detach_label(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, label_id)): Path<(i64, i64)>,
) -> ApiResult<ProductResponse> {
    let product = db::products::detach_label(&state.pool, id, label_id).await?;
    Ok(Json(product.to_response(user.stock_visible())))
}
