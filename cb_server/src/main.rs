//! Contacts API server.
//!
//! Loads configuration, connects to PostgreSQL, applies migrations and serves
//! the HTTP API until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use cb_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use contact_book::{auth::AuthManager, db::Database};
use log::{info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Run the contacts API server

USAGE:
  cb_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL               PostgreSQL connection string
  JWT_SECRET                 JWT signing secret (required, 32+ characters)
  PASSWORD_PEPPER            Password hashing pepper (optional, 16+ characters)
  ACCESS_TOKEN_TTL_MINUTES   Access token lifetime [default: 15]
  REFRESH_TOKEN_TTL_DAYS     Refresh token lifetime [default: 7]
  METRICS_BIND               Prometheus exporter address (disabled when unset)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{}/metrics", metrics_bind);
    }

    info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    db.migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database connected successfully");

    let users = Arc::new(db.users());
    let auth_manager = Arc::new(AuthManager::new(
        users.clone(),
        config.security.auth_config()?,
    ));

    let app = api::create_router(AppState {
        auth_manager,
        users,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
