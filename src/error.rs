// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::authorization::AuthError;
use crate::services::reassignment::{SupervisorError, ValidationError};
use crate::services::users::UserAdminError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest {
        code: &'static str,
        message: String,
    },

    // 401 Unauthorized
    Unauthorized {
        code: &'static str,
        message: String,
    },

    // 403 Forbidden
    Forbidden {
        code: &'static str,
        message: String,
    },

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError {
        code: &'static str,
        message: String,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest { .. } => 400,
            ApiError::Unauthorized { .. } => 401,
            ApiError::Forbidden { .. } => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError { .. } => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::Unauthorized { message, .. } => message,
            ApiError::Forbidden { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { code, .. } => code,
            ApiError::Unauthorized { code, .. } => code,
            ApiError::Forbidden { code, .. } => code,
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError { code, .. } => code,
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    pub fn bad_request_code(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn unauthorized_code(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            code,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden {
            code: "FORBIDDEN",
            message: message.into(),
        }
    }

    pub fn forbidden_code(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Forbidden {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            code: "INTERNAL_SERVER_ERROR",
            message: message.into(),
        }
    }

    pub fn internal_code(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            code,
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert domain error types to ApiError
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            // Unknown and soft-deleted callers render identically.
            AuthError::UserNotFound { .. } => {
                ApiError::unauthorized_code(err.error_code(), "User not found")
            }
            AuthError::InsufficientPrivileges { operation } => ApiError::forbidden_code(
                err.error_code(),
                format!("Insufficient privileges for {}", operation),
            ),
            AuthError::Directory(e) => {
                tracing::error!("Directory error during authorization: {}", e);
                ApiError::service_unavailable("User directory temporarily unavailable")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request_code(err.error_code(), err.to_string())
    }
}

impl From<crate::database::users::DirectoryError> for ApiError {
    fn from(err: crate::database::users::DirectoryError) -> Self {
        use crate::database::users::DirectoryError;
        match err {
            DirectoryError::NotFound(id) => ApiError::not_found(format!("User not found: {}", id)),
            DirectoryError::EmailTaken(email) => {
                ApiError::conflict(format!("Email already registered: {}", email))
            }
            DirectoryError::Database(e) => {
                tracing::error!("Directory database error: {}", e);
                ApiError::service_unavailable("User directory temporarily unavailable")
            }
            DirectoryError::Unavailable(msg) => {
                tracing::error!("Directory unavailable: {}", msg);
                ApiError::service_unavailable("User directory temporarily unavailable")
            }
            DirectoryError::CorruptRole { user_id, source } => {
                tracing::error!("Corrupt role for user {}: {}", user_id, source);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DirectoryError::PartialWrite { expected, updated } => {
                tracing::error!(
                    "Partial supervisor write: {} of {} rows updated",
                    updated,
                    expected
                );
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<SupervisorError> for ApiError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::Auth(e) => e.into(),
            SupervisorError::Validation(e) => e.into(),
            SupervisorError::Directory(e) => e.into(),
            SupervisorError::AssignmentFailed { source } => {
                tracing::error!("Supervisor assignment failed: {}", source);
                ApiError::internal_code(
                    "SUPERVISOR_ASSIGNMENT_FAILED",
                    "Supervisor assignment failed; no changes were applied",
                )
            }
        }
    }
}

impl From<UserAdminError> for ApiError {
    fn from(err: UserAdminError) -> Self {
        match err {
            UserAdminError::Auth(e) => e.into(),
            UserAdminError::Validation(e) => e.into(),
            UserAdminError::Directory(e) => e.into(),
        }
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        tracing::error!("Database error: {}", err);
        ApiError::service_unavailable("Database temporarily unavailable")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
