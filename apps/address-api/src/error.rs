//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Address API                        │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<Json<T>, ApiError>                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Database Error? ─── DbError::QueryFailed("...") ──┐                   │
//! │         │                                          │                   │
//! │         ▼                                          ▼                   │
//! │  Rule violated? ─── CoreError::CompanyNotLinked ── ApiError ──► JSON   │
//! │         │                                                  + status    │
//! │         ▼                                                               │
//! │  Success ──────────────────────────────────────────────────► 200 JSON  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "title": "Company Not Linked",
//!   "message": "Address needs to be linked to a Company. Please add a row for Company in the Links table."
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use address_core::CoreError;
use address_db::{DbError, ServiceError};

/// API error returned from HTTP handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Short title for an error dialog
    pub title: String,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// A save was rejected by an address rule (417)
    ValidationError,

    /// Request could not be interpreted (400)
    BadRequest,

    /// Record already exists (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::EXPECTATION_FAILED,
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, title: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError {
            code,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} Not Found", resource),
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, "Bad Request", message)
    }

    fn database(message: &str) -> Self {
        ApiError::new(ErrorCode::DatabaseError, "Database Error", message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                "Duplicate Entry",
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid Reference", "Invalid reference")
            }
            DbError::ConnectionFailed(_) => ApiError::database("Database connection failed"),
            DbError::MigrationFailed(_) => ApiError::database("Database migration failed"),
            DbError::PoolExhausted => ApiError::database("Database pool exhausted"),
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::database("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::database("Database transaction failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::database("Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let title = err.title();
        match err {
            CoreError::AddressNotFound(id) => ApiError::not_found("Address", &id),
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", &id),
            CoreError::CompanyNotLinked => ApiError::new(
                ErrorCode::ValidationError,
                title,
                CoreError::CompanyNotLinked.to_string(),
            ),
            CoreError::Validation(e) => ApiError::new(ErrorCode::ValidationError, title, e.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rule(e) => e.into(),
            ServiceError::Db(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;
