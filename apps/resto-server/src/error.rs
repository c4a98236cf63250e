//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Resto Server                           │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                     │
//! │         │                                                               │
//! │         ├── DbError::NotFound ───────────────► 404 NOT_FOUND            │
//! │         ├── DbError::Conflict / Unique ──────► 409 CONFLICT             │
//! │         ├── CoreError::ItemUnavailable ──────► 422 ITEM_UNAVAILABLE     │
//! │         ├── ValidationError ─────────────────► 400 VALIDATION_ERROR     │
//! │         ├── bad / revoked token ─────────────► 401 UNAUTHORIZED         │
//! │         ├── cashier on manager route ────────► 403 FORBIDDEN            │
//! │         └── DbError::QueryFailed ... ────────► 500 DATABASE_ERROR       │
//! │                                                (details only in logs)   │
//! │                                                                         │
//! │  Body: { "code": "NOT_FOUND", "message": "Menu item not found: ..." }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use resto_core::{CoreError, ValidationError};
use resto_db::DbError;

pub type ApiResult<T> = Result<T, ApiError>;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Menu item not found: 8f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing, invalid, expired or revoked credentials (401)
    Unauthorized,

    /// Role not allowed (403)
    Forbidden,

    /// State conflict: duplicate name, shift already open/closed (409)
    Conflict,

    /// Menu item cannot be sold (422)
    ItemUnavailable,

    /// Stock change would go below zero (422)
    InsufficientStock,

    /// Cart operation failed (422)
    CartError,

    /// Business logic error (422)
    BusinessLogic,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ItemUnavailable
            | ErrorCode::InsufficientStock
            | ErrorCode::CartError
            | ErrorCode::BusinessLogic => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Returned when an operation needs the restaurant's open shift.
    pub fn no_open_shift() -> Self {
        ApiError::conflict("No shift is open. Open a shift first.")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::Conflict(message) => ApiError::conflict(message),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ItemUnavailable { .. } => ApiError::new(ErrorCode::ItemUnavailable, message),
            CoreError::SessionAlreadyClosed { .. } => ApiError::conflict(message),
            CoreError::OrderNotInSession { .. } => {
                tracing::error!("{}", message);
                ApiError::new(ErrorCode::BusinessLogic, message)
            }
            CoreError::EmptyCart | CoreError::CartTooLarge { .. } => {
                ApiError::new(ErrorCode::CartError, message)
            }
            CoreError::QuantityTooLarge { .. } => ApiError::validation(message),
            CoreError::NotInCart(_) => ApiError::new(ErrorCode::NotFound, message),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
