//! Application error handling
//!
//! One unified error type for control flow (`Result`-based, converted with
//! `From`) and for HTTP responses (actix `ResponseError` with a structured
//! JSON body). Domain-specific inner enums keep the causes precise for
//! logging while the client-facing mapping stays deliberately coarse.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} bytes)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Authentication failures
///
/// The variants exist for logs and tests only. Every one of them renders as
/// the same generic 401 body so a caller cannot tell an unknown account from
/// a wrong password, or a revoked token from an expired one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    MissingToken,
    MalformedHeader,
    EmptyToken,
    InvalidToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid credentials"),
            AuthError::MissingToken => write!(f, "missing authorization header"),
            AuthError::MalformedHeader => write!(f, "malformed authorization header"),
            AuthError::EmptyToken => write!(f, "empty token in authorization header"),
            AuthError::InvalidToken => write!(f, "invalid, expired, or revoked token"),
        }
    }
}

impl StdError for AuthError {}

/// Storage backend errors
#[derive(Debug)]
pub enum StoreError {
    Conflict(String),
    NotFound(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "duplicate entry: {}", msg),
            StoreError::NotFound(msg) => write!(f, "not found: {}", msg),
            StoreError::Backend(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    Forbidden(String),
    NotFound(String),
    Store(StoreError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Forbidden(msg) => write!(f, "forbidden: {}", msg),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            StoreError::Conflict("email already registered".to_string())
        } else if error_msg.contains("no rows") {
            StoreError::NotFound("record not found".to_string())
        } else {
            StoreError::Backend(error_msg)
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating a response with server logs
    pub error_id: String,
    /// Client-safe error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    /// Status, machine code, and client-safe message for this error.
    ///
    /// Internal detail never leaks here: authentication failures collapse to
    /// one generic body for the whole class, and backend/internal failures
    /// are replaced with an opaque message (the detail goes to the log,
    /// findable via the error_id echoed in the response).
    fn client_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Auth(_) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "authentication failed".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", what),
            ),
            AppError::Store(e) => match e {
                StoreError::Conflict(msg) => (StatusCode::CONFLICT, "DUPLICATE_ENTRY", msg.clone()),
                StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                StoreError::Backend(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "storage error occurred".to_string(),
                ),
            },
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error".to_string(),
            ),
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Store(StoreError::Backend(_)) | AppError::Internal(_) => {
                tracing::error!(error_id = error_id, error = %self, "Request failed");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication rejected");
            }
            _ => {
                tracing::warn!(error_id = error_id, error = %self, "Request rejected");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let (status, code, message) = self.client_parts();
        let body = ErrorResponse::new(error_id, message, code.to_string(), status.as_u16());

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.client_parts().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn validation_error_converts_to_app_error() {
        let val_err = ValidationError::InvalidFormat("test".to_string());
        let app_err: AppError = val_err.into();
        match app_err {
            AppError::Validation(_) => (),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn status_codes_match_error_classes() {
        assert_eq!(
            AppError::Validation(ValidationError::EmptyField("body".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth(AuthError::InvalidToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("not the author".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("post".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Store(StoreError::Conflict("email".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_share_one_client_message() {
        let causes = [
            AuthError::InvalidCredentials,
            AuthError::MissingToken,
            AuthError::MalformedHeader,
            AuthError::EmptyToken,
            AuthError::InvalidToken,
        ];

        let bodies: Vec<(StatusCode, &'static str, String)> = causes
            .into_iter()
            .map(|cause| AppError::Auth(cause).client_parts())
            .collect();

        for (status, code, message) in &bodies {
            assert_eq!(*status, StatusCode::UNAUTHORIZED);
            assert_eq!(*code, "UNAUTHORIZED");
            assert_eq!(message, &bodies[0].2);
        }
    }

    #[test]
    fn sqlx_duplicate_key_maps_to_conflict() {
        let err = sqlx::Error::Protocol(
            "duplicate key value violates unique constraint \"users_email_key\"".into(),
        );
        match StoreError::from(err) {
            StoreError::Conflict(_) => (),
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn opaque_messages_for_internal_failures() {
        let (_, _, message) =
            AppError::Store(StoreError::Backend("connection reset by peer".into())).client_parts();
        assert!(!message.contains("connection reset"));

        let (_, _, message) = AppError::Internal("secret detail".into()).client_parts();
        assert!(!message.contains("secret detail"));
    }
}
