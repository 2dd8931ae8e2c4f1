//! Database access layer
//!
//! Free functions over `&PgPool` with raw SQL. Multi-step mutations open
//! one transaction and either commit everything or roll back everything;
//! business failures surface as typed [`crate::error::ServiceError`]s.

pub mod customers;
pub mod inventory;
pub mod labels;
pub mod orders;
pub mod products;
pub mod users;
