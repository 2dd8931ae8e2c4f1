//! Unified service-layer error type
//!
//! `ServiceError` bridges the gap between DB-layer errors (`sqlx::Error`,
//! `BoxError`) and the API-layer error (`AppError`). It enables `?`
//! propagation without manual `.map_err(|e| { tracing::error!(...);
//! AppError::new(...) })` boilerplate, and translates the PostgreSQL
//! SQLSTATEs this domain cares about into client-facing codes.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error — only two variants.
///
/// - `Db`: database/infrastructure errors (auto-logged, mapped per SQLSTATE)
/// - `App`: business-rule errors (transparent pass-through to the client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => map_db_error(db_err),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<ServiceError> for BoxError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => Box::new(app_err),
            ServiceError::Db(db_err) => db_err,
        }
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Translate a database error into a client-facing AppError.
///
/// SQLSTATEs handled:
/// - 23505 unique_violation      -> AlreadyExists (sku, label name, email)
/// - 23514 check_violation       -> ValidationFailed
/// - 23503 foreign_key_violation -> ValidationFailed
/// - 55P03 lock_not_available    -> LockTimeout (retryable as a whole)
fn map_db_error(err: BoxError) -> AppError {
    if let Some(sqlx_err) = err.downcast_ref::<sqlx::Error>()
        && let Some(db_err) = sqlx_err.as_database_error()
        && let Some(code) = db_err.code()
    {
        match code.as_ref() {
            "23505" => {
                return AppError::with_message(
                    ErrorCode::AlreadyExists,
                    "A record with this unique value already exists",
                );
            }
            "23514" => {
                return AppError::with_message(
                    ErrorCode::ValidationFailed,
                    "Value violates a storage constraint",
                );
            }
            "23503" => {
                return AppError::with_message(
                    ErrorCode::ValidationFailed,
                    "Referenced record does not exist",
                );
            }
            "55P03" => {
                return AppError::new(ErrorCode::LockTimeout);
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Service database error");
    AppError::new(ErrorCode::InternalError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_passes_through() {
        let svc: ServiceError = AppError::insufficient_stock(7, "Keyboard").into();
        let app: AppError = svc.into();
        assert_eq!(app.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn test_opaque_db_error_maps_to_internal() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = "connection reset".into();
        let app: AppError = ServiceError::Db(boxed).into();
        assert_eq!(app.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_row_not_found_maps_to_internal() {
        // NotFound decisions are made by the db layer with explicit
        // queries, never by bubbling RowNotFound to the client.
        let app: AppError = ServiceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(app.code, ErrorCode::InternalError);
    }
}
