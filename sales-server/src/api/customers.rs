//! Customer endpoints

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router, middleware};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};

use super::ApiResult;
use crate::auth::require_permission;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let read = Router::new()
        .route("/api/customers", get(list))
        .route("/api/customers/{id}", get(get_one))
        .route_layer(middleware::from_fn(require_permission("customers:read")));

    let write = Router::new()
        .route("/api/customers", post(create))
        .route("/api/customers/{id}", put(update))
        .route("/api/customers/{id}", delete(delete_one))
        .route_layer(middleware::from_fn(require_permission("customers:write")));

    read.merge(write)
}

async fn list(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    Ok(Json(db::customers::list_customers(&state.pool).await?))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Customer> {
    Ok(Json(db::customers::get_customer(&state.pool, id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(data): Json<CustomerCreate>,
) -> ApiResult<Customer> {
    Ok(Json(db::customers::create_customer(&state.pool, &data).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<CustomerUpdate>,
) -> ApiResult<Customer> {
    Ok(Json(db::customers::update_customer(&state.pool, id, &data).await?))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::customers::delete_customer(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
