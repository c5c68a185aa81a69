//! API error type
//!
//! Request-level failures only. Row-level outcomes inside an ETL batch
//! (rejected rows, duplicate skips, reference errors) are values in the
//! batch log, never errors: a bad row must not abort the batch.
//!
//! Every error body is `{"detail": "..."}`, suitable for direct display
//! by the frontend.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request: validation failure, unknown status value,
    /// unresolved client reference (400)
    #[error("{0}")]
    BadRequest(String),

    /// ETL called with neither file present (400)
    #[error("Debe proporcionarse al menos un fichero CSV (clientes_file o incidencias_file)")]
    EmptyBatch,

    /// Store timeout or connection failure (503, retryable)
    #[error("Almacén de datos no disponible: {0}")]
    StoreUnavailable(String),

    /// Database operation failed (500)
    #[error("Error de base de datos: {0}")]
    Database(sqlx::Error),

    /// Internal server error (500)
    #[error("Error interno: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Pool acquire timeout is the store-access timeout: surface as
            // retryable unavailability rather than a generic 500
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                ApiError::StoreUnavailable(err.to_string())
            }
            otro => ApiError::Database(otro),
        }
    }
}

impl From<soportes_common::Error> for ApiError {
    fn from(err: soportes_common::Error) -> Self {
        use soportes_common::Error;
        match err {
            Error::Database(e) => ApiError::from(e),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Io(e) => ApiError::Internal(e.to_string()),
            Error::Config(msg) => ApiError::Internal(msg),
            Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::EmptyBatch => StatusCode::BAD_REQUEST,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "detail": self.to_string() }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
