//! Startup seeding
//!
//! Explicit bootstrap invoked once at process startup, after migrations:
//! ensures the superuser account exists, and optionally seeds the demo
//! accounts used in development.

use shared::error::AppError;
use sqlx::PgPool;

use crate::config::Config;
use crate::db;
use crate::error::ServiceResult;
use crate::util::hash_password;

/// Demo accounts: one per role plus one with no role at all
const DEMO_USERS: &[(&str, &str, Option<&str>)] = &[
    ("manager1", "managerpass", Some("MANAGER")),
    ("seller1", "sellerpass", Some("SELLER")),
    ("viewer1", "viewerpass", Some("VIEWER")),
    ("norole", "norolepass", None),
];

pub async fn run(pool: &PgPool, config: &Config) -> ServiceResult<()> {
    ensure_admin(pool, config).await?;
    if config.seed_demo {
        seed_demo_users(pool).await?;
    }
    Ok(())
}

/// Create the superuser account if no superuser exists yet
async fn ensure_admin(pool: &PgPool, config: &Config) -> ServiceResult<()> {
    if db::users::superuser_exists(pool).await? {
        return Ok(());
    }

    let hash = hash_password(&config.admin_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    let created =
        db::users::create_if_absent(pool, &config.admin_username, &hash, None, true).await?;
    if created {
        tracing::info!(username = %config.admin_username, "Superuser created");
    }
    Ok(())
}

/// Idempotently create the demo users (development only)
async fn seed_demo_users(pool: &PgPool) -> ServiceResult<()> {
    for (username, password, role) in DEMO_USERS {
        let hash = hash_password(password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        let created = db::users::create_if_absent(pool, username, &hash, *role, false).await?;
        if created {
            tracing::info!(username = %username, role = role.unwrap_or("none"), "Demo user created");
        }
    }
    Ok(())
}
