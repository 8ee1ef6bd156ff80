//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. The response body always
//! carries a `msg` field; the status code reflects the error kind.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{AuthError, CatalogError, SessionError};

/// Application-level error type for the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration or sign-in failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session token rejected or could not be signed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Missing or malformed credentials on a protected route.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::AlreadyExists => StatusCode::CONFLICT,
                AuthError::NotFound => StatusCode::NOT_FOUND,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Session(err) => match err {
                SessionError::Invalid | SessionError::Expired => StatusCode::UNAUTHORIZED,
                SessionError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(err) => match err {
                CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
                CatalogError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    fn message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(msg) => msg.clone(),
                AuthError::AlreadyExists => "User already exists".to_owned(),
                AuthError::NotFound => "User not found".to_owned(),
                AuthError::InvalidCredentials => "Invalid email or password".to_owned(),
                AuthError::StoreUnavailable(_) => "Service temporarily unavailable".to_owned(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_owned()
                }
            },
            Self::Session(err) => match err {
                SessionError::Expired => "Session expired".to_owned(),
                SessionError::Invalid => "Invalid session token".to_owned(),
                SessionError::Signing(_) => "Internal server error".to_owned(),
            },
            Self::Catalog(err) => match err {
                CatalogError::Validation(msg) => msg.clone(),
                CatalogError::StoreUnavailable(_) => "Service temporarily unavailable".to_owned(),
                CatalogError::Repository(_) => "Internal server error".to_owned(),
            },
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
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
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "msg": self.message() }))).into_response()
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

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
