//! sales-server — sales management backend
//!
//! Long-running service that:
//! - Serves the catalog / customer / order REST API (JWT authenticated,
//!   role-based authorization)
//! - Runs the transactional order lifecycle over PostgreSQL row locks
//! - Seeds accounts at startup and exports daily order CSVs

use std::path::PathBuf;

use sales_server::config::Config;
use sales_server::state::AppState;
use sales_server::{api, services};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting sales-server (env: {})", config.environment);

    // Initialize application state (pool + migrations)
    let state = AppState::new(&config).await?;

    // Seed accounts: explicit bootstrap instead of a migration side effect
    services::bootstrap::run(&state.pool, &config).await?;

    // Daily CSV export loop
    services::export::spawn_daily_export(
        state.clone(),
        PathBuf::from(&config.export_dir),
        config.export_hour_utc,
    );

    // Build router
    let app = api::create_router(state).layer(tower_http::trace::TraceLayer::new_for_http());

    // Start HTTP server
    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("sales-server HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
