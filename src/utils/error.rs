//! Error handling for the backend
//!
//! This module defines all error types used throughout the service.

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the backend
pub type Result<T> = std::result::Result<T, ApiError>;

/// Main error type for the backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing bearer token
    #[error("Missing authentication token")]
    MissingToken,

    /// Invalid, malformed or expired token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token subject no longer exists; reported identically to an invalid token
    #[error("Invalid or expired token")]
    UnknownUser,

    /// Authentication errors (bad credentials, disabled account message, ...)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Role gate rejections
    #[error("{0}")]
    ForbiddenRole(String),

    /// Resource scoping rejections (role ok, row not owned)
    #[error("{0}")]
    OwnershipViolation(String),

    /// Role is student/teacher but no profile row is linked yet
    #[error("{0}")]
    ProfileNotLinked(String),

    /// Account exists but is not active
    #[error("{0}")]
    AccountInactive(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (uniqueness violations, duplicate links)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Crypto errors (password hashing/verification)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// File storage errors
    #[error("File storage error: {0}")]
    FileStorage(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            ApiError::MissingToken => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "MISSING_TOKEN",
                self.to_string(),
            ),
            ApiError::InvalidToken | ApiError::UnknownUser | ApiError::Jwt(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid or expired token".to_string(),
            ),
            ApiError::Auth(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "AUTH_ERROR",
                self.to_string(),
            ),
            ApiError::ForbiddenRole(_) => (
                actix_web::http::StatusCode::FORBIDDEN,
                "FORBIDDEN_ROLE",
                self.to_string(),
            ),
            ApiError::OwnershipViolation(_) => (
                actix_web::http::StatusCode::FORBIDDEN,
                "NOT_OWNER",
                self.to_string(),
            ),
            ApiError::AccountInactive(_) => (
                actix_web::http::StatusCode::FORBIDDEN,
                "ACCOUNT_INACTIVE",
                self.to_string(),
            ),
            ApiError::ProfileNotLinked(_) => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "PROFILE_NOT_LINKED",
                self.to_string(),
            ),
            ApiError::Validation(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            ApiError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            ApiError::Conflict(_) => (
                actix_web::http::StatusCode::CONFLICT,
                "CONFLICT",
                self.to_string(),
            ),
            ApiError::Database(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database operation failed".to_string(),
            ),
            _ => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Standard error response format
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}

/// Helper functions for creating specific errors
impl ApiError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::ForbiddenRole(message.into())
    }

    pub fn not_owner<S: Into<String>>(message: S) -> Self {
        Self::OwnershipViolation(message.into())
    }

    pub fn profile_not_linked<S: Into<String>>(message: S) -> Self {
        Self::ProfileNotLinked(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn crypto<S: Into<String>>(message: S) -> Self {
        Self::Crypto(message.into())
    }

    pub fn file_storage<S: Into<String>>(message: S) -> Self {
        Self::FileStorage(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_creation() {
        let error = ApiError::auth("Invalid credentials");
        assert!(matches!(error, ApiError::Auth(_)));

        let error = ApiError::validation("Missing parameter");
        assert!(matches!(error, ApiError::Validation(_)));
    }

    #[test]
    fn test_unknown_user_reads_like_invalid_token() {
        // A stale token must not be distinguishable from a forged one.
        assert_eq!(
            ApiError::UnknownUser.to_string(),
            ApiError::InvalidToken.to_string()
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::MissingToken.error_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::forbidden("nope").error_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::not_owner("not yours").error_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::profile_not_linked("no profile")
                .error_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::not_found("missing").error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::conflict("dup").error_response().status(),
            StatusCode::CONFLICT
        );
    }
}
