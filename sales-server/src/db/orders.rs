//! Order lifecycle database operations
//!
//! Every mutation here runs inside a single transaction: stock
//! reservation, price freezing and order persistence commit together or
//! not at all. Product rows are always locked in ascending-id order
//! before any mutation, at every multi-product call site, so overlapping
//! orders serialize on their shared products instead of deadlocking.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use shared::error::AppError;
use shared::models::order::{order_total, subtotal};
use shared::models::{
    OrderCreate, OrderDetail, OrderItemDetail, OrderStatus, OrderSummary, Transition,
};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use super::inventory;
use crate::error::ServiceResult;

/// Bound lock waits so a blocked transaction surfaces a retryable
/// conflict instead of queueing indefinitely (SQLSTATE 55P03).
const LOCK_TIMEOUT_SQL: &str = "SET LOCAL lock_timeout = '5s'";

// =============================================================================
// Row types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct LockedProduct {
    id: i64,
    name: String,
    price: Decimal,
    stock: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
    unit_price: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    customer_id: i64,
    customer_email: String,
    status: String,
    created_at: DateTime<Utc>,
    items_count: i64,
    total_amount: Decimal,
}

fn parse_status(raw: &str) -> ServiceResult<OrderStatus> {
    OrderStatus::parse(raw)
        .ok_or_else(|| AppError::internal(format!("Unknown order status in store: {raw}")).into())
}

// =============================================================================
// Create
// =============================================================================

/// Create an order: validate, lock products, reserve stock, freeze prices.
///
/// All-or-nothing — any failure rolls back every partial write.
pub async fn create_order(pool: &PgPool, req: &OrderCreate) -> ServiceResult<OrderDetail> {
    if req.items.is_empty() {
        return Err(AppError::validation("Order must contain at least one item")
            .with_detail("field", "items")
            .into());
    }
    for item in &req.items {
        if item.quantity <= 0 {
            return Err(AppError::validation(format!(
                "Quantity must be positive, got {}",
                item.quantity
            ))
            .with_detail("field", "quantity")
            .with_detail("product_id", item.product_id)
            .into());
        }
    }

    let mut tx = pool.begin().await?;
    sqlx::query(LOCK_TIMEOUT_SQL).execute(&mut *tx).await?;

    let customer: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = $1")
        .bind(req.customer_id)
        .fetch_optional(&mut *tx)
        .await?;
    if customer.is_none() {
        return Err(
            AppError::validation(format!("Customer {} not found", req.customer_id))
                .with_detail("field", "customer_id")
                .into(),
        );
    }

    let mut product_ids: Vec<i64> = req.items.iter().map(|i| i.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();

    // Lock every referenced product, ascending id
    let locked: Vec<LockedProduct> = sqlx::query_as(
        "SELECT id, name, price, stock FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(&product_ids)
    .fetch_all(&mut *tx)
    .await?;

    let mut remaining: HashMap<i64, (String, Decimal, i64)> = locked
        .into_iter()
        .map(|p| (p.id, (p.name, p.price, p.stock)))
        .collect();

    // Validate each line against the remaining stock, so duplicate lines
    // for the same product accumulate; record per-product reservations.
    let mut reservations: BTreeMap<i64, i64> = BTreeMap::new();
    let mut frozen: Vec<(i64, i64, Decimal)> = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let Some((name, price, stock)) = remaining.get_mut(&item.product_id) else {
            return Err(
                AppError::validation(format!("Product {} not found", item.product_id))
                    .with_detail("product_id", item.product_id)
                    .into(),
            );
        };
        if *stock < item.quantity {
            return Err(AppError::insufficient_stock(item.product_id, name.clone()).into());
        }
        *stock -= item.quantity;
        *reservations.entry(item.product_id).or_insert(0) += item.quantity;
        frozen.push((item.product_id, item.quantity, *price));
    }

    let (order_id, created_at): (i64, DateTime<Utc>) =
        sqlx::query_as("INSERT INTO orders (customer_id) VALUES ($1) RETURNING id, created_at")
            .bind(req.customer_id)
            .fetch_one(&mut *tx)
            .await?;

    // Bulk-insert items with the frozen unit prices
    let order_ids: Vec<i64> = frozen.iter().map(|_| order_id).collect();
    let item_products: Vec<i64> = frozen.iter().map(|(p, _, _)| *p).collect();
    let quantities: Vec<i64> = frozen.iter().map(|(_, q, _)| *q).collect();
    let unit_prices: Vec<Decimal> = frozen.iter().map(|(_, _, u)| *u).collect();
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity, unit_price)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::bigint[], $4::numeric[])
        "#,
    )
    .bind(&order_ids)
    .bind(&item_products)
    .bind(&quantities)
    .bind(&unit_prices)
    .execute(&mut *tx)
    .await?;

    // Reserve stock per product under the locks held above
    for (product_id, qty) in &reservations {
        inventory::reserve(&mut tx, *product_id, *qty).await?;
    }

    let detail = load_detail(&mut tx, order_id).await?.ok_or_else(|| {
        AppError::internal(format!("Order {} missing right after insert", order_id))
    })?;
    tx.commit().await?;

    tracing::info!(
        order_id,
        customer_id = req.customer_id,
        created_at = %created_at,
        total = %detail.total_amount,
        "Order created"
    );
    Ok(detail)
}

// =============================================================================
// Lifecycle transitions
// =============================================================================

/// Transition PENDING -> PAID. Idempotent on an already-paid order;
/// fails with a conflict on a cancelled one. No inventory side effect —
/// stock was reserved at creation.
pub async fn pay_order(pool: &PgPool, order_id: i64) -> ServiceResult<OrderDetail> {
    let mut tx = pool.begin().await?;
    sqlx::query(LOCK_TIMEOUT_SQL).execute(&mut *tx).await?;

    let status = lock_order_status(&mut tx, order_id).await?;
    match status.next_on_pay() {
        Transition::Apply(next) => {
            set_status(&mut tx, order_id, next).await?;
            tracing::info!(order_id, from = %status, to = %next, "Order paid");
        }
        Transition::NoOp => {}
        Transition::Rejected => {
            return Err(AppError::invalid_transition(format!(
                "Order {} cannot be paid from status {}",
                order_id, status
            ))
            .into());
        }
    }

    let detail = finish_with_detail(tx, order_id).await?;
    Ok(detail)
}

/// Transition PENDING/PAID -> CANCELLED, restocking every item under the
/// same ascending-id product lock discipline as creation. Idempotent on
/// an already-cancelled order.
pub async fn cancel_order(pool: &PgPool, order_id: i64) -> ServiceResult<OrderDetail> {
    let mut tx = pool.begin().await?;
    sqlx::query(LOCK_TIMEOUT_SQL).execute(&mut *tx).await?;

    let status = lock_order_status(&mut tx, order_id).await?;
    match status.next_on_cancel() {
        Transition::Apply(next) => {
            restock_items(&mut tx, order_id).await?;
            set_status(&mut tx, order_id, next).await?;
            tracing::info!(order_id, from = %status, to = %next, "Order cancelled and restocked");
        }
        Transition::NoOp => {}
        Transition::Rejected => {
            return Err(AppError::invalid_transition(format!(
                "Order {} cannot be cancelled from status {}",
                order_id, status
            ))
            .into());
        }
    }

    let detail = finish_with_detail(tx, order_id).await?;
    Ok(detail)
}

/// Lock the order row and return its current status
async fn lock_order_status(tx: &mut PgConnection, order_id: i64) -> ServiceResult<OrderStatus> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
    let (raw,) = row.ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;
    parse_status(&raw)
}

async fn set_status(tx: &mut PgConnection, order_id: i64, status: OrderStatus) -> ServiceResult<()> {
    sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(order_id)
        .execute(tx)
        .await?;
    Ok(())
}

/// Return every reserved quantity of an order to product stock.
///
/// Quantities are aggregated per product and the product rows locked in
/// ascending id order before any increment.
async fn restock_items(tx: &mut PgConnection, order_id: i64) -> ServiceResult<()> {
    let per_product: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT product_id, SUM(quantity)::bigint
        FROM order_items WHERE order_id = $1
        GROUP BY product_id ORDER BY product_id
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *tx)
    .await?;

    let product_ids: Vec<i64> = per_product.iter().map(|(p, _)| *p).collect();
    sqlx::query("SELECT id FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(&product_ids)
        .execute(&mut *tx)
        .await?;

    for (product_id, qty) in per_product {
        inventory::release(&mut *tx, product_id, qty).await?;
    }
    Ok(())
}

async fn finish_with_detail(
    mut tx: sqlx::Transaction<'_, Postgres>,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let detail = load_detail(&mut tx, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;
    tx.commit().await?;
    Ok(detail)
}

// =============================================================================
// Reads
// =============================================================================

/// Load a full order with items and derived total
async fn load_detail(
    conn: &mut PgConnection,
    order_id: i64,
) -> ServiceResult<Option<OrderDetail>> {
    let order: Option<OrderRow> =
        sqlx::query_as("SELECT id, customer_id, status, created_at FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(order) = order else {
        return Ok(None);
    };

    let item_rows: Vec<ItemRow> = sqlx::query_as(
        r#"
        SELECT i.id, i.product_id, p.name AS product_name, i.quantity, i.unit_price
        FROM order_items i
        JOIN products p ON p.id = i.product_id
        WHERE i.order_id = $1
        ORDER BY i.id
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    let items: Vec<OrderItemDetail> = item_rows
        .into_iter()
        .map(|r| OrderItemDetail {
            id: r.id,
            product_id: r.product_id,
            product_name: r.product_name,
            quantity: r.quantity,
            unit_price: r.unit_price,
            subtotal: subtotal(r.unit_price, r.quantity),
        })
        .collect();

    let status = parse_status(&order.status)?;
    Ok(Some(OrderDetail {
        id: order.id,
        customer_id: order.customer_id,
        status,
        created_at: order.created_at,
        total_amount: order_total(&items),
        items,
    }))
}

pub async fn get_order(pool: &PgPool, order_id: i64) -> ServiceResult<OrderDetail> {
    let mut conn = pool.acquire().await?;
    load_detail(&mut conn, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)).into())
}

/// Filters for the order list
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    /// Case-insensitive substring match on the customer email
    pub customer_email: Option<String>,
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound on the creation date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date
    pub date_to: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

/// Escape LIKE wildcards in a user-supplied substring
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// List orders, newest first, with derived totals and item counts
pub async fn list_orders(pool: &PgPool, filter: &OrderFilter) -> ServiceResult<Vec<OrderSummary>> {
    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        r#"
        SELECT o.id, o.customer_id, c.email AS customer_email, o.status, o.created_at,
               COUNT(i.id) AS items_count,
               COALESCE(SUM(i.unit_price * i.quantity), 0) AS total_amount
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        LEFT JOIN order_items i ON i.order_id = o.id
        WHERE 1 = 1
        "#,
    );

    if let Some(email) = &filter.customer_email {
        qb.push(" AND c.email ILIKE ");
        qb.push_bind(format!("%{}%", escape_like(email)));
    }
    if let Some(status) = filter.status {
        qb.push(" AND o.status = ");
        qb.push_bind(status.as_str());
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND o.created_at >= ");
        qb.push_bind(from.and_time(NaiveTime::MIN).and_utc());
    }
    if let Some(to) = filter.date_to {
        // inclusive end of day: strictly before the next midnight
        let end = to.succ_opt().unwrap_or(to).and_time(NaiveTime::MIN).and_utc();
        qb.push(" AND o.created_at < ");
        qb.push_bind(end);
    }

    qb.push(" GROUP BY o.id, c.email ORDER BY o.created_at DESC, o.id DESC LIMIT ");
    qb.push_bind(filter.limit);
    qb.push(" OFFSET ");
    qb.push_bind(filter.offset);

    let rows: Vec<SummaryRow> = qb.build_query_as().fetch_all(pool).await?;
    rows.into_iter()
        .map(|r| {
            Ok(OrderSummary {
                id: r.id,
                customer_id: r.customer_id,
                customer_email: r.customer_email,
                status: parse_status(&r.status)?,
                created_at: r.created_at,
                items_count: r.items_count,
                total_amount: r.total_amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("a%b_c"), "a\\%b\\_c");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_filter_query_shape() {
        // The builder must only add predicates for set filters
        let filter = OrderFilter {
            customer_email: Some("smith".to_string()),
            status: Some(OrderStatus::Paid),
            date_from: None,
            date_to: None,
            limit: 20,
            offset: 0,
        };
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1 WHERE 1 = 1");
        if let Some(email) = &filter.customer_email {
            qb.push(" AND c.email ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(email)));
        }
        if let Some(status) = filter.status {
            qb.push(" AND o.status = ");
            qb.push_bind(status.as_str());
        }
        let sql = qb.into_sql();
        assert!(sql.contains("c.email ILIKE $1"));
        assert!(sql.contains("o.status = $2"));
    }

    #[test]
    fn test_parse_status_rejects_garbage() {
        assert!(parse_status("PAID").is_ok());
        assert!(parse_status("paid").is_err());
        assert!(parse_status("SHIPPED").is_err());
    }
}
