//! User account database operations

use sqlx::PgPool;

use crate::error::ServiceResult;

/// User account row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub hashed_password: String,
    pub role: Option<String>,
    pub is_superuser: bool,
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> ServiceResult<Option<UserRow>> {
    let user: Option<UserRow> = sqlx::query_as(
        "SELECT id, username, hashed_password, role, is_superuser FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn superuser_exists(pool: &PgPool) -> ServiceResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_superuser")
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Insert a user if the username is free; returns whether a row was created
pub async fn create_if_absent(
    pool: &PgPool,
    username: &str,
    hashed_password: &str,
    role: Option<&str>,
    is_superuser: bool,
) -> ServiceResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, hashed_password, role, is_superuser)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(username)
    .bind(hashed_password)
    .bind(role)
    .bind(is_superuser)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
