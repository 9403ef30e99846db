//! Authentication middleware for protected endpoints.
//!
//! Extracts the bearer access token from the `Authorization` header, runs it
//! through [`AuthManager::authorize`](contact_book::auth::AuthManager::authorize)
//! and injects the authenticated [`User`] into request extensions.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Extension, Router, routing::get, middleware};
//! use contact_book::auth::User;
//! # use cb_server::api::middleware::auth_middleware;
//! # use cb_server::api::AppState;
//! # let state: AppState = unimplemented!();
//!
//! async fn whoami(Extension(user): Extension<User>) -> String {
//!     format!("Authenticated as {}", user.username)
//! }
//!
//! let protected: Router<AppState> = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! # let _ = protected;
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use contact_book::auth::{AuthError, Rejection};

use super::{AppState, error::ApiError, request_id::RequestId};
use crate::{logging, metrics};

/// Token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authentication middleware that authorizes the bearer token and injects the user.
///
/// # Behavior
///
/// - **Success**: Token authorizes → `User` inserted into extensions → next handler
/// - **Missing header / any rejection**: `401 Unauthorized`, whatever the cause
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()) else {
        metrics::authorization_rejections_total(Rejection::MissingCredentials.label());
        return Err(ApiError(Rejection::MissingCredentials.into()));
    };

    match state.auth_manager.authorize(token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Err(AuthError::Unauthorized(reason)) => {
            metrics::authorization_rejections_total(reason.label());
            logging::log_security_event(
                "authorization_rejected",
                None,
                request.extensions().get::<RequestId>().map(RequestId::as_str),
                &format!("{} {}: {}", request.method(), request.uri().path(), reason),
            );
            Err(ApiError(AuthError::Unauthorized(reason)))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_forms() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
    }
}
