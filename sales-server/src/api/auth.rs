//! Authentication endpoint: login

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::Role;

use super::ApiResult;
use crate::auth::jwt;
use crate::db;
use crate::state::AppState;
use crate::util::verify_password;

/// POST /api/auth/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(serde::Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Option<Role>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let user = db::users::find_by_username(&state.pool, req.username.trim())
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(AppError::invalid_credentials());
    }

    let role = user.role.as_deref().and_then(Role::parse);
    let token = jwt::create_token(
        user.id,
        &user.username,
        role,
        user.is_superuser,
        &state.jwt_secret,
    )
    .map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::internal("Failed to issue token")
    })?;

    tracing::info!(user_id = user.id, username = %user.username, "Login");

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        role,
    }))
}
