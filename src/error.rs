// HTTP API Error Types
use axum::{
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::auth::{JwtError, PasswordError};
use crate::database::DatabaseError;

/// Fixed body for every gate denial; the failing check is only logged.
pub const PERMISSION_DENIED: &str = "permission denied";

/// Errors returned by handlers and the authorization gate
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    InvalidArgument(String),
    Validation(Vec<String>),
    NotFound(String),
    Conflict(String),
    MethodNotAllowed(Method),
    InvalidCredentials,
    Store(DatabaseError),
    Internal(String),

    // 403 Forbidden, fixed message
    Unauthenticated(String),
    Forbidden(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the caller
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidArgument(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Validation(failures) => failures.join(", "),
            ApiError::MethodNotAllowed(method) => format!("method not allowed {}", method),
            ApiError::InvalidCredentials => "not authenticated".to_string(),
            ApiError::Store(err) => err.to_string(),
            ApiError::Unauthenticated(_) | ApiError::Forbidden(_) => PERMISSION_DENIED.to_string(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

// Static constructor methods
impl ApiError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }

    pub fn invalid_id(raw: &str) -> Self {
        ApiError::InvalidArgument(format!("invalid id given {}", raw))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        ApiError::Unauthenticated(reason.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        ApiError::Forbidden(reason.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::NotFound(msg),
            DatabaseError::Conflict(msg) => ApiError::Conflict(msg),
            other => {
                tracing::error!("Store error: {}", other);
                ApiError::Store(other)
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(reason) => ApiError::Unauthenticated(reason),
            other => {
                tracing::error!("Token signing failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing failed: {}", err);
        ApiError::Internal(err.to_string())
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
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
