//! HTTP API for the contacts server.
//!
//! # Modules
//!
//! - [`auth`]: Signup, login, logout and token refresh handlers
//! - [`middleware`]: Bearer-token authorization for protected endpoints
//! - [`request_id`]: Request correlation, request logging and metrics
//! - [`error`]: Mapping of authentication errors to HTTP responses
//!
//! # Endpoints
//!
//! ```text
//! GET  /                  - Service banner (public)
//! GET  /health            - Health status as JSON (public)
//! GET  /api/healthchecker - Database connectivity check (public)
//! POST /auth/signup       - Create user, JSON body (public)
//! POST /auth/login        - Password form login (public)
//! POST /auth/refresh      - Rotate tokens, bearer refresh token
//! POST /auth/logout       - Revoke session, bearer access token
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cb_server::api::{AppState, create_router};
//! use contact_book::auth::{AuthConfig, AuthManager};
//! use contact_book::db::InMemoryUserRepository;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let users = Arc::new(InMemoryUserRepository::new());
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::new(users.clone(), AuthConfig::new("0123456789abcdef0123456789abcdef"))),
//!     users,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use contact_book::{auth::AuthManager, db::UserRepository};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    /// User directory, used directly for health checks
    pub users: Arc<dyn UserRepository>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/healthchecker", get(healthchecker))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        // Refresh authenticates with the refresh token itself
        .route("/auth/refresh", post(auth::refresh));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "Contacts API" }))
}

/// Database connectivity check.
///
/// `200 OK` when the user directory answers, `500` otherwise.
async fn healthchecker(State(state): State<AppState>) -> impl IntoResponse {
    match state.users.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Welcome to the Contacts API!" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Error connecting to the database" })),
            )
        }
    }
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` if the database is reachable, or `503 Service Unavailable`.
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","version":"0.1.0","database":true,"timestamp":"2025-11-22T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = state.users.health_check().await.is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
