//! Service error taxonomy shared by the database layer and the API.
//!
//! Every expected, recoverable-by-caller condition carries a human-readable
//! reason string. Storage failures stay opaque: the full error is logged
//! server-side and clients only see a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A business invariant was violated (duplicate enrollment, cap reached,
    /// professor clash, capacity full, already-dropped, ...).
    #[error("{0}")]
    Conflict(String),

    /// The requesting identity does not own the affected resource.
    #[error("{0}")]
    PermissionDenied(String),

    /// Missing/invalid credentials or token.
    #[error("{0}")]
    Unauthorized(String),

    /// Malformed input rejected before touching the store.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        ServiceError::PermissionDenied(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ServiceError::Unauthorized(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::Internal(message.into())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ServiceError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ServiceError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ha ocurrido un error interno en el servidor".to_string(),
                )
            }
            ServiceError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ha ocurrido un error interno en el servidor".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
