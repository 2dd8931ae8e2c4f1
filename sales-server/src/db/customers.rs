//! Customer database operations

use shared::error::AppError;
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use sqlx::PgPool;

use crate::error::ServiceResult;

#[derive(Debug, Clone, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(r: CustomerRow) -> Self {
        Customer {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            created_at: r.created_at,
        }
    }
}

pub async fn list_customers(pool: &PgPool) -> ServiceResult<Vec<Customer>> {
    let rows: Vec<CustomerRow> = sqlx::query_as(
        "SELECT id, first_name, last_name, email, created_at FROM customers ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Customer::from).collect())
}

pub async fn get_customer(pool: &PgPool, id: i64) -> ServiceResult<Customer> {
    let row: Option<CustomerRow> = sqlx::query_as(
        "SELECT id, first_name, last_name, email, created_at FROM customers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(Customer::from)
        .ok_or_else(|| AppError::not_found(format!("Customer {}", id)).into())
}

pub async fn create_customer(pool: &PgPool, data: &CustomerCreate) -> ServiceResult<Customer> {
    let email = data.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("Invalid email")
            .with_detail("field", "email")
            .into());
    }

    let row: CustomerRow = sqlx::query_as(
        r#"
        INSERT INTO customers (first_name, last_name, email)
        VALUES ($1, $2, $3)
        RETURNING id, first_name, last_name, email, created_at
        "#,
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&email)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

pub async fn update_customer(
    pool: &PgPool,
    id: i64,
    data: &CustomerUpdate,
) -> ServiceResult<Customer> {
    let email = data.email.as_ref().map(|e| e.trim().to_lowercase());
    if email.as_ref().is_some_and(|e| e.is_empty() || !e.contains('@')) {
        return Err(AppError::validation("Invalid email")
            .with_detail("field", "email")
            .into());
    }

    let row: Option<CustomerRow> = sqlx::query_as(
        r#"
        UPDATE customers SET
            first_name = COALESCE($1, first_name),
            last_name = COALESCE($2, last_name),
            email = COALESCE($3, email)
        WHERE id = $4
        RETURNING id, first_name, last_name, email, created_at
        "#,
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&email)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(Customer::from)
        .ok_or_else(|| AppError::not_found(format!("Customer {}", id)).into())
}

pub async fn delete_customer(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let rows = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Customer {}", id)).into());
    }
    Ok(())
}
