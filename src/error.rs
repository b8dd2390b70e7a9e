//! Error types for the Libroteca server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchRecord = 4,
    BadValue = 5,
    Duplicate = 6,
    InactiveStudent = 7,
    DuplicateRequest = 8,
    AlreadyReviewed = 9,
    AlreadyReturned = 10,
    NoCopiesAvailable = 11,
    MaxBooksReached = 12,
    ConsistencyViolation = 13,
}

/// Main application error type
///
/// Every lifecycle transition returns one of these as a typed result so the
/// UI can render a specific message; no operation throws unstructured errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Student is not active: {0}")]
    InactiveStudent(String),

    #[error("Duplicate request: {0}")]
    DuplicateRequest(String),

    #[error("Request already reviewed: {0}")]
    AlreadyReviewed(String),

    #[error("Borrowing already returned: {0}")]
    AlreadyReturned(String),

    #[error("No copies available: {0}")]
    NoCopiesAvailable(String),

    #[error("Borrowing limit reached: {0}")]
    MaxBooksReached(String),

    #[error("Inventory consistency violation: {0}")]
    Consistency(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::InactiveStudent(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InactiveStudent, msg.clone())
            }
            AppError::DuplicateRequest(msg) => {
                (StatusCode::CONFLICT, ErrorCode::DuplicateRequest, msg.clone())
            }
            AppError::AlreadyReviewed(msg) => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyReviewed, msg.clone())
            }
            AppError::AlreadyReturned(msg) => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyReturned, msg.clone())
            }
            AppError::NoCopiesAvailable(msg) => {
                (StatusCode::CONFLICT, ErrorCode::NoCopiesAvailable, msg.clone())
            }
            AppError::MaxBooksReached(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::MaxBooksReached, msg.clone())
            }
            AppError::Consistency(msg) => {
                // Indicates a prior accounting bug or a lost update, never user error.
                tracing::error!("Consistency violation: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::ConsistencyViolation,
                    "Inventory consistency violation".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
