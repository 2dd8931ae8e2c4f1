//! Order lifecycle tests against a live PostgreSQL instance
//!
//! These exercise the full transactional path: locking, reservation,
//! price freezing, restocking, and the concurrency guarantee. They need
//! a database, so they are ignored by default:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/sales_test cargo test -- --ignored
//! ```

use rust_decimal::Decimal;
use sales_server::db::{customers, orders, products};
use sales_server::error::ServiceError;
use shared::error::{AppError, ErrorCode};
use shared::models::{CustomerCreate, OrderCreate, OrderItemInput, OrderStatus, ProductCreate};
use sqlx::PgPool;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    let pool = PgPool::connect(&url).await.expect("connect");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrate");
    pool
}

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos()
}

async fn seed_product(pool: &PgPool, name: &str, price: i64, stock: i64) -> i64 {
    let data = ProductCreate {
        name: name.to_string(),
        sku: format!("{}-{}", name.to_uppercase(), unique_suffix()),
        price: Decimal::from(price),
        stock,
    };
    products::create_product(pool, &data).await.expect("product").id
}

async fn seed_customer(pool: &PgPool) -> i64 {
    let data = CustomerCreate {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: format!("jane{}@example.com", unique_suffix()),
    };
    customers::create_customer(pool, &data).await.expect("customer").id
}

async fn stock_of(pool: &PgPool, product_id: i64) -> i64 {
    products::get_product(pool, product_id).await.expect("product").stock
}

fn app_error(e: ServiceError) -> AppError {
    e.into()
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn create_pay_cancel_full_flow() {
    let pool = test_pool().await;
    let mouse = seed_product(&pool, "Mouse", 100, 10).await;
    let keyboard = seed_product(&pool, "Keyboard", 50, 5).await;
    let customer = seed_customer(&pool).await;

    let order = orders::create_order(
        &pool,
        &OrderCreate {
            customer_id: customer,
            items: vec![
                OrderItemInput { product_id: mouse, quantity: 2 },
                OrderItemInput { product_id: keyboard, quantity: 1 },
            ],
        },
    )
    .await
    .expect("create order");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::from(250));
    assert_eq!(stock_of(&pool, mouse).await, 8);
    assert_eq!(stock_of(&pool, keyboard).await, 3);

    // Catalog price change must not affect the frozen order total
    products::update_product(
        &pool,
        mouse,
        &shared::models::ProductUpdate {
            name: None,
            sku: None,
            price: Some(Decimal::from(999)),
            stock: None,
        },
    )
    .await
    .expect("price change");
    let fetched = orders::get_order(&pool, order.id).await.expect("get order");
    assert_eq!(fetched.total_amount, Decimal::from(250));
    assert_eq!(fetched.items[0].unit_price, Decimal::from(100));

    // Cancel restores both stocks exactly
    let cancelled = orders::cancel_order(&pool, order.id).await.expect("cancel");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&pool, mouse).await, 10);
    assert_eq!(stock_of(&pool, keyboard).await, 5);

    // Re-cancel is a no-op returning the same state
    let again = orders::cancel_order(&pool, order.id).await.expect("re-cancel");
    assert_eq!(again.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&pool, mouse).await, 10);
    assert_eq!(stock_of(&pool, keyboard).await, 5);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn insufficient_stock_rolls_back_everything() {
    let pool = test_pool().await;
    let mouse = seed_product(&pool, "Mouse", 100, 10).await;
    let keyboard = seed_product(&pool, "Keyboard", 50, 1).await;
    let customer = seed_customer(&pool).await;

    let err = orders::create_order(
        &pool,
        &OrderCreate {
            customer_id: customer,
            items: vec![
                OrderItemInput { product_id: mouse, quantity: 2 },
                OrderItemInput { product_id: keyboard, quantity: 3 },
            ],
        },
    )
    .await
    .expect_err("must fail");

    let err = app_error(err);
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    let details = err.details.expect("details");
    assert_eq!(details.get("product_id").expect("product_id"), &serde_json::json!(keyboard));

    // No partial mutation committed
    assert_eq!(stock_of(&pool, mouse).await, 10);
    assert_eq!(stock_of(&pool, keyboard).await, 1);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn duplicate_lines_accumulate_against_stock() {
    let pool = test_pool().await;
    let mouse = seed_product(&pool, "Mouse", 100, 3).await;
    let customer = seed_customer(&pool).await;

    // 2 + 2 of the same product exceeds stock 3 even though each line fits
    let err = orders::create_order(
        &pool,
        &OrderCreate {
            customer_id: customer,
            items: vec![
                OrderItemInput { product_id: mouse, quantity: 2 },
                OrderItemInput { product_id: mouse, quantity: 2 },
            ],
        },
    )
    .await
    .expect_err("must fail");
    assert_eq!(app_error(err).code, ErrorCode::InsufficientStock);
    assert_eq!(stock_of(&pool, mouse).await, 3);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn pay_is_idempotent_and_conflicts_after_cancel() {
    let pool = test_pool().await;
    let mouse = seed_product(&pool, "Mouse", 100, 10).await;
    let customer = seed_customer(&pool).await;

    let order = orders::create_order(
        &pool,
        &OrderCreate {
            customer_id: customer,
            items: vec![OrderItemInput { product_id: mouse, quantity: 1 }],
        },
    )
    .await
    .expect("create order");

    let paid = orders::pay_order(&pool, order.id).await.expect("pay");
    assert_eq!(paid.status, OrderStatus::Paid);
    // Paying reserves nothing further
    assert_eq!(stock_of(&pool, mouse).await, 9);

    let paid_again = orders::pay_order(&pool, order.id).await.expect("pay again");
    assert_eq!(paid_again.status, OrderStatus::Paid);
    assert_eq!(paid_again.total_amount, paid.total_amount);

    // PAID -> CANCELLED restocks
    let cancelled = orders::cancel_order(&pool, order.id).await.expect("cancel");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&pool, mouse).await, 10);

    // Paying a cancelled order is a conflict
    let err = orders::pay_order(&pool, order.id).await.expect_err("must conflict");
    assert_eq!(app_error(err).code, ErrorCode::InvalidTransition);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn concurrent_orders_never_oversell() {
    let pool = test_pool().await;
    let mouse = seed_product(&pool, "Mouse", 100, 1).await;
    let customer = seed_customer(&pool).await;

    let req = OrderCreate {
        customer_id: customer,
        items: vec![OrderItemInput { product_id: mouse, quantity: 1 }],
    };

    let (a, b) = tokio::join!(
        orders::create_order(&pool, &req),
        orders::create_order(&pool, &req),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one of the two orders must win");

    let failure = match (a, b) {
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => e,
        _ => unreachable!("one side must fail"),
    };
    assert_eq!(app_error(failure).code, ErrorCode::InsufficientStock);
    assert_eq!(stock_of(&pool, mouse).await, 0);
}
