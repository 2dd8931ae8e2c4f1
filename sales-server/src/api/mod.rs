//! API routes
//!
//! Public routes: health check and login. Everything else sits behind
//! the JWT authentication middleware, and each resource route carries a
//! `require_permission` layer — so an authenticated user without a role
//! is denied on every resource, reads included.

pub mod auth;
pub mod customers;
pub mod health;
pub mod labels;
pub mod orders;
pub mod products;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::auth::require_auth;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, shared::error::AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(products::router())
        .merge(labels::router())
        .merge(customers::router())
        .merge(orders::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}
