//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`. Every error body has the shape
//! `{"detail": "<message>"}`.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, RecipeError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Recipe operation failed.
    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeds the configured limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::Recipe(RecipeError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            Self::Database(RepositoryError::Conflict(_))
            | Self::BadRequest(_)
            | Self::Recipe(RecipeError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidCredentials
                | AuthError::UserAlreadyExists
                | AuthError::WeakPassword(_)
                | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database(_) | Self::Recipe(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client. Internal details are never exposed.
    #[must_use]
    pub fn detail(&self) -> String {
        if self.status().is_server_error() {
            return "Internal server error".to_owned();
        }
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => {
                    "Unable to authenticate with provided credentials".to_owned()
                }
                AuthError::Unauthorized => "Invalid token.".to_owned(),
                AuthError::UserAlreadyExists => "user with this email already exists.".to_owned(),
                AuthError::InvalidEmail(e) => format!("Enter a valid email address: {e}"),
                AuthError::WeakPassword(msg) | AuthError::Validation(msg) => msg.clone(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_owned()
                }
            },
            Self::Recipe(RecipeError::NotFound) | Self::Database(RepositoryError::NotFound) => {
                "Not found.".to_owned()
            }
            Self::Recipe(err) => err.to_string(),
            Self::Database(RepositoryError::Conflict(msg))
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::PayloadTooLarge => "Request body is too large.".to_owned(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        }
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

// A malformed ID can never name an existing row.
impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        Self::NotFound("Not found.".to_owned())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current request.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("recipe-123".to_string());
        assert_eq!(err.to_string(), "Not found: recipe-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Recipe(RecipeError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unauthorized_sets_www_authenticate() {
        let response = AppError::Auth(AuthError::Unauthorized).into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Token"
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("connection string leaked".to_string());
        assert_eq!(err.detail(), "Internal server error");

        let err = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(
            err.detail(),
            "Unable to authenticate with provided credentials"
        );
    }
}
