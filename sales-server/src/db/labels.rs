//! Label database operations

use shared::error::AppError;
use shared::models::Label;
use sqlx::PgPool;

use crate::error::ServiceResult;

pub async fn list_labels(pool: &PgPool) -> ServiceResult<Vec<Label>> {
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM labels ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, name)| Label { id, name })
        .collect())
}

pub async fn get_label(pool: &PgPool, id: i64) -> ServiceResult<Label> {
    let row: Option<(i64, String)> = sqlx::query_as("SELECT id, name FROM labels WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let (id, name) = row.ok_or_else(|| AppError::not_found(format!("Label {}", id)))?;
    Ok(Label { id, name })
}

pub async fn create_label(pool: &PgPool, name: &str) -> ServiceResult<Label> {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO labels (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(Label {
        id,
        name: name.to_string(),
    })
}

/// Find a label by name, creating it if absent
pub async fn get_or_create_by_name(pool: &PgPool, name: &str) -> ServiceResult<Label> {
    // The no-op DO UPDATE makes RETURNING yield the row in both cases
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO labels (name) VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(Label {
        id,
        name: name.to_string(),
    })
}

pub async fn update_label(pool: &PgPool, id: i64, name: &str) -> ServiceResult<Label> {
    let rows = sqlx::query("UPDATE labels SET name = $1 WHERE id = $2")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Label {}", id)).into());
    }
    Ok(Label {
        id,
        name: name.to_string(),
    })
}

pub async fn delete_label(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let rows = sqlx::query("DELETE FROM labels WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Label {}", id)).into());
    }
    Ok(())
}
