//! Product database operations

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::error::AppError;
use shared::models::{Label, LabelAttach, Product, ProductCreate, ProductUpdate};
use sqlx::PgPool;

use super::labels;
use crate::error::ServiceResult;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    sku: String,
    price: Decimal,
    stock: i64,
}

impl ProductRow {
    fn into_product(self, labels: Vec<Label>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            sku: self.sku,
            price: self.price,
            stock: self.stock,
            labels,
        }
    }
}

/// Load labels for a set of products, grouped by product id
async fn label_map(pool: &PgPool, product_ids: &[i64]) -> ServiceResult<HashMap<i64, Vec<Label>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        r#"
        SELECT pl.product_id, l.id, l.name
        FROM product_labels pl
        JOIN labels l ON l.id = pl.label_id
        WHERE pl.product_id = ANY($1)
        ORDER BY l.id
        "#,
    )
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<i64, Vec<Label>> = HashMap::new();
    for (product_id, id, name) in rows {
        map.entry(product_id).or_default().push(Label { id, name });
    }
    Ok(map)
}

pub async fn list_products(pool: &PgPool) -> ServiceResult<Vec<Product>> {
    let rows: Vec<ProductRow> =
        sqlx::query_as("SELECT id, name, sku, price, stock FROM products ORDER BY id")
            .fetch_all(pool)
            .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut labels = label_map(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let product_labels = labels.remove(&r.id).unwrap_or_default();
            r.into_product(product_labels)
        })
        .collect())
}

pub async fn get_product(pool: &PgPool, id: i64) -> ServiceResult<Product> {
    let row: Option<ProductRow> =
        sqlx::query_as("SELECT id, name, sku, price, stock FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    let row = row.ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;

    let mut labels = label_map(pool, &[row.id]).await?;
    let product_labels = labels.remove(&row.id).unwrap_or_default();
    Ok(row.into_product(product_labels))
}

pub async fn create_product(pool: &PgPool, data: &ProductCreate) -> ServiceResult<Product> {
    if data.price < Decimal::ZERO {
        return Err(AppError::validation("Price cannot be negative")
            .with_detail("field", "price")
            .into());
    }
    if data.stock < 0 {
        return Err(AppError::validation("Stock cannot be negative")
            .with_detail("field", "stock")
            .into());
    }

    let row: ProductRow = sqlx::query_as(
        r#"
        INSERT INTO products (name, sku, price, stock)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, sku, price, stock
        "#,
    )
    .bind(&data.name)
    .bind(&data.sku)
    .bind(data.price)
    .bind(data.stock)
    .fetch_one(pool)
    .await?;
    Ok(row.into_product(vec![]))
}

pub async fn update_product(pool: &PgPool, id: i64, data: &ProductUpdate) -> ServiceResult<Product> {
    if data.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::validation("Price cannot be negative")
            .with_detail("field", "price")
            .into());
    }
    if data.stock.is_some_and(|s| s < 0) {
        return Err(AppError::validation("Stock cannot be negative")
            .with_detail("field", "stock")
            .into());
    }

    let row: Option<ProductRow> = sqlx::query_as(
        r#"
        UPDATE products SET
            name = COALESCE($1, name),
            sku = COALESCE($2, sku),
            price = COALESCE($3, price),
            stock = COALESCE($4, stock)
        WHERE id = $5
        RETURNING id, name, sku, price, stock
        "#,
    )
    .bind(&data.name)
    .bind(&data.sku)
    .bind(data.price)
    .bind(data.stock)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let row = row.ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;

    let mut labels = label_map(pool, &[row.id]).await?;
    let product_labels = labels.remove(&row.id).unwrap_or_default();
    Ok(row.into_product(product_labels))
}

pub async fn delete_product(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let rows = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Product {}", id)).into());
    }
    Ok(())
}

/// Attach a label by id, or by name with create-if-absent
pub async fn attach_label(
    pool: &PgPool,
    product_id: i64,
    attach: &LabelAttach,
) -> ServiceResult<Product> {
    let label = match (attach.label_id, attach.label_name.as_deref()) {
        (Some(label_id), _) => labels::get_label(pool, label_id).await?,
        (None, Some(name)) => labels::get_or_create_by_name(pool, name).await?,
        (None, None) => {
            return Err(AppError::validation("Provide label_id or label_name").into());
        }
    };

    let rows = sqlx::query(
        r#"
        INSERT INTO product_labels (product_id, label_id)
        SELECT $1, $2 WHERE EXISTS (SELECT 1 FROM products WHERE id = $1)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(product_id)
    .bind(label.id)
    .execute(pool)
    .await?;

    // Attaching twice is fine; a missing product is not
    if rows.rows_affected() == 0 {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::not_found(format!("Product {}", product_id)).into());
        }
    }

    get_product(pool, product_id).await
}

pub async fn detach_label(pool: &PgPool, product_id: i64, label_id: i64) -> ServiceResult<Product> {
    // 404 for an unknown label, mirroring attach-by-id
    labels::get_label(pool, label_id).await?;

    sqlx::query("DELETE FROM product_labels WHERE product_id = $1 AND label_id = $2")
        .bind(product_id)
        .bind(label_id)
        .execute(pool)
        .await?;

    get_product(pool, product_id).await
}
