//! Mapping of authentication errors onto HTTP responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use contact_book::auth::AuthError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AuthError::UsernameTaken => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidPassword | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Database(_)
            | AuthError::HashingFailed
            | AuthError::TokenLifetimeOutOfRange
            | AuthError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.client_message(),
        });

        if status == StatusCode::UNAUTHORIZED {
            (
                status,
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                body,
            )
                .into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contact_book::auth::{Rejection, TokenError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(AuthError::UsernameTaken).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError(AuthError::UserNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(AuthError::InvalidPassword).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError(AuthError::Unauthorized(Rejection::Token(TokenError::Expired))).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError(AuthError::InvalidInput("bad".to_string())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError(AuthError::HashingFailed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_response_has_challenge_header() {
        let response = ApiError(AuthError::Unauthorized(Rejection::SessionRevoked)).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }
}
