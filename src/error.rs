use std::path::PathBuf;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// ── Store errors ──────────────────────────────────────────────────────────────

/// Failure while reading or writing the backing file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a catalog operation can report back to its caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Lookup, update or delete target is absent.
    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: String },

    /// The backing file could not be read or written.
    /// The in-memory state is still authoritative.
    #[error("failed to persist catalog to {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: PersistError,
    },

    /// The catalog document is inconsistent (duplicate ids on load).
    /// Record fields themselves are never checked.
    #[error("invalid catalog: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn product_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            kind: "Product",
            id: id.to_string(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<PersistError>) -> Self {
        StoreError::Persistence {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ── HTTP errors ───────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(StoreError),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::Validation(msg) => AppError::BadRequest(msg),
            other => AppError::Store(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Store(err) => {
                error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
