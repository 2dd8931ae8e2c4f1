//! Inventory ledger
//!
//! Stock deltas on product rows. Both operations are plain single-row
//! updates; they perform NO locking themselves.
//!
//! Precondition: the caller must invoke these inside a transaction that
//! already holds the product's row lock (`SELECT ... FOR UPDATE`), so
//! that concurrent reservations against the same product serialize.
//! Call sites that lock multiple products must acquire the locks in
//! ascending product-id order.

use sqlx::PgConnection;

use crate::error::ServiceResult;

/// Decrement stock by `qty`.
///
/// The caller has already validated `qty <= stock` under the held lock;
/// the `CHECK (stock >= 0)` constraint backstops that invariant.
pub async fn reserve(conn: &mut PgConnection, product_id: i64, qty: i64) -> ServiceResult<()> {
    sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2")
        .bind(qty)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Increment stock by `qty`, unconditionally (no upper bound).
pub async fn release(conn: &mut PgConnection, product_id: i64, qty: i64) -> ServiceResult<()> {
    sqlx::query("UPDATE products SET stock = stock + $1 WHERE id = $2")
        .bind(qty)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}
