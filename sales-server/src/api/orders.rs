//! Order endpoints
//!
//! Listing supports the admin filters (customer email substring, status,
//! creation-date range) with newest-first ordering; create/pay/cancel
//! delegate to the transactional lifecycle in `db::orders`.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{OrderCreate, OrderDetail, OrderStatus, OrderSummary};

use super::ApiResult;
use crate::auth::require_permission;
use crate::db;
use crate::db::orders::OrderFilter;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let read = Router::new()
        .route("/api/orders", get(list))
        .route("/api/orders/{id}", get(get_one))
        .route_layer(middleware::from_fn(require_permission("orders:read")));

    let write = Router::new()
        .route("/api/orders", post(create))
        .route("/api/orders/{id}/pay", post(pay))
        .route("/api/orders/{id}/cancel", post(cancel))
        .route_layer(middleware::from_fn(require_permission("orders:write")));

    read.merge(write)
}

/// GET /api/orders
#[derive(Deserialize)]
pub struct OrdersQuery {
    pub customer_email: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<OrderSummary>> {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(OrderStatus::parse(raw).ok_or_else(|| {
            AppError::validation(format!("Unknown status {raw:?}")).with_detail("field", "status")
        })?),
    };

    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let filter = OrderFilter {
        customer_email: query.customer_email,
        status,
        date_from: query.date_from,
        date_to: query.date_to,
        limit: per_page,
        offset: (page - 1) * per_page,
    };

    Ok(Json(db::orders::list_orders(&state.pool, &filter).await?))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<OrderDetail> {
    Ok(Json(db::orders::get_order(&state.pool, id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(data): Json<OrderCreate>,
) -> ApiResult<OrderDetail> {
    Ok(Json(db::orders::create_order(&state.pool, &data).await?))
}

async fn pay(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<OrderDetail> {
    Ok(Json(db::orders::pay_order(&state.pool, id).await?))
}

async fn cancel(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<OrderDetail> {
    Ok(Json(db::orders::cancel_order(&state.pool, id).await?))
}
