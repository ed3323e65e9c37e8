//! # Errores
//! src/error.rs
//!
//! - [`ApiError`]: errores de los handlers, se convierten en respuestas HTTP
//! - [`Error`]: errores de arranque del servidor

use crate::config::ConfigError;
use crate::generation::GenerationError;
use crate::http::{Response, StatusCode};
use crate::jobs::storage::StoreError;
use thiserror::Error;
use tracing::error;

/// Mensaje genérico para errores internos; el detalle sólo va al log
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errores que un handler devuelve al cliente
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BadRequest,
            ApiError::NotFound(_) => StatusCode::NotFound,
            ApiError::Internal(_) => StatusCode::InternalServerError,
        }
    }

    /// Convierte el error en respuesta `{"error": ...}`
    ///
    /// Los errores internos se registran y se responden con un mensaje genérico.
    pub fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => Response::error(StatusCode::BadRequest, &message),
            ApiError::NotFound(message) => Response::error(StatusCode::NotFound, &message),
            ApiError::Internal(detail) => {
                error!(%detail, "request failed");
                Response::error(StatusCode::InternalServerError, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

/// Errores de arranque
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("job store error: {0}")]
    Store(#[from] StoreError),

    #[error("generation client error: {0}")]
    Generation(#[from] GenerationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
