use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::MessageResponse;

/// ValidationError
///
/// Field-level input failures. Detected before any store access, so a rejected request never
/// leaves a partial write behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Product name must be 3 to 50 characters long, letters and spaces only")]
    InvalidName,
    #[error("Price must be a non-negative number")]
    InvalidPrice,
    #[error("Quantity must be a non-negative integer")]
    InvalidQuantity,
    #[error("Login email address must be a valid email")]
    InvalidEmail,
    #[error("Missing email or password")]
    MissingCredentials,
    #[error("Invalid request: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// The request field the error refers to, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::InvalidName => Some("name"),
            ValidationError::InvalidPrice => Some("price"),
            ValidationError::InvalidQuantity => Some("quantity"),
            ValidationError::InvalidEmail => Some("email"),
            ValidationError::MissingCredentials | ValidationError::Malformed(_) => None,
        }
    }
}

/// StoreError
///
/// Failures raised by `Repository` backends. Both backends report a missing record as
/// `NotFound`; everything else is a fault of the store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("no product id left after {0}")]
    IdExhausted(i64),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// AppError
///
/// The single error taxonomy of the HTTP surface. Every handler, extractor and middleware
/// rejects with this type, whatever backend is in use.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Access denied. No valid token provided.")]
    Unauthenticated,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Access denied. Insufficient role.")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Internal detail is logged, never sent to the client.
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed with an internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}
