//! Authentication API handlers.
//!
//! This module provides HTTP REST endpoints for:
//! - Signup with username and password (JSON body)
//! - Login with an OAuth2-style password form
//! - Logout, which revokes every outstanding token of the caller
//! - Token refresh with the current refresh token
//!
//! # Examples
//!
//! Signup:
//! ```bash
//! curl -X POST http://localhost:8000/auth/signup \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "pw"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8000/auth/login \
//!   -d 'username=alice&password=pw'
//! ```

use axum::{
    Extension, Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use contact_book::auth::{
    AuthError, LoginRequest, Rejection, SessionTokens, SignupRequest, User,
};

use super::{AppState, error::ApiError, middleware::bearer_token, request_id::RequestId};
use crate::{logging, metrics};

/// Create a new user account.
///
/// # Response
///
/// `201 Created` with the user record (no password hash):
/// ```json
/// { "id": 1, "username": "alice", "refresh_token": null, "created_at": "..." }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username already taken
/// - `422 Unprocessable Entity`: Username or password rejected
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.auth_manager.signup(request).await?;

    metrics::signups_total();
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticate a user and generate session tokens.
///
/// Takes an OAuth2-style password form; extra fields such as `grant_type`
/// are ignored.
///
/// # Response
///
/// `200 OK` with tokens:
/// ```json
/// { "access_token": "eyJhbGciOiJIUzI1NiIs...", "refresh_token": "eyJhbGciOiJIUzI1NiIs..." }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown username
/// - `401 Unauthorized`: Wrong password
pub async fn login(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Form(request): Form<LoginRequest>,
) -> Result<Json<SessionTokens>, ApiError> {
    let username = request.username.clone();
    let result = state.auth_manager.login(request).await;

    metrics::login_attempts_total(result.is_ok());
    if let Err(AuthError::InvalidPassword) = &result {
        logging::log_security_event(
            "failed_login",
            Some(&username),
            request_id.as_ref().map(|Extension(id)| id.as_str()),
            "Invalid password attempt",
        );
    }

    Ok(Json(result?))
}

/// Logout the authenticated user.
///
/// Clears the stored refresh token; existing access tokens stop working
/// immediately even before they expire.
///
/// # Response
///
/// `200 OK` with the updated user record (`refresh_token` is `null`).
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<User>, ApiError> {
    let user = state.auth_manager.logout(&user).await?;
    metrics::logouts_total();
    Ok(Json(user))
}

/// Exchange the current refresh token for a new token pair.
///
/// Expects `Authorization: Bearer <refresh_token>`. The old refresh token is
/// invalidated.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, invalid, rotated-out or revoked refresh token
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionTokens>, ApiError> {
    let Some(token) = bearer_token(&headers) else {
        metrics::authorization_rejections_total(Rejection::MissingCredentials.label());
        return Err(ApiError(Rejection::MissingCredentials.into()));
    };

    match state.auth_manager.refresh(token).await {
        Ok(tokens) => Ok(Json(tokens)),
        Err(AuthError::Unauthorized(reason)) => {
            metrics::authorization_rejections_total(reason.label());
            Err(ApiError(AuthError::Unauthorized(reason)))
        }
        Err(e) => Err(e.into()),
    }
}
