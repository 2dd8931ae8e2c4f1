//! Authentication middleware
//!
//! Axum middleware for JWT authentication and per-route authorization.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use super::{CurrentUser, jwt};
use crate::state::AppState;

/// Authentication middleware — requires a valid bearer token.
///
/// Extracts and verifies the JWT from `Authorization: Bearer <token>`,
/// then injects [`CurrentUser`] into request extensions.
///
/// | Failure | HTTP status |
/// |---------|-------------|
/// | Missing Authorization header | 401 |
/// | Malformed header | 401 |
/// | Expired token | 401 |
/// | Invalid token | 401 |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => jwt::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(uri = %req.uri(), "Request without credentials");
            return Err(AppError::unauthorized());
        }
    };

    let claims = jwt::validate_token(token, &state.jwt_secret).inspect_err(|e| {
        tracing::warn!(uri = %req.uri(), error = %e, "Token rejected");
    })?;

    let user = CurrentUser::from(claims);
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Authorization middleware — requires a specific permission.
///
/// Applied as a `route_layer` after `require_auth`. Superusers bypass the
/// check; users with no role are denied (fail-closed).
///
/// ```ignore
/// Router::new()
///     .route("/api/products", get(handler::list))
///     .route_layer(middleware::from_fn(require_permission("products:read")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::unauthorized)?;

            if !user.has_permission(permission) {
                tracing::warn!(
                    user_id = user.id,
                    username = %user.username,
                    required_permission = permission,
                    "Permission denied"
                );
                return Err(AppError::forbidden(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
