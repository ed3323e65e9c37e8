//! Errores de la generación de itinerarios

use crate::generation::schema::ValidationError;
use crate::jobs::storage::StoreError;
use thiserror::Error;

/// Errores que terminan un job como `failed`
///
/// El `Display` de cada variante es lo que queda guardado en el campo
/// `error` del job.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Generation request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Generation response contained no content")]
    EmptyResponse,

    #[error("Generated content is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Generated itinerary is invalid: {0}")]
    Validation(#[from] ValidationError),

    #[error("Job storage failed: {0}")]
    Store(#[from] StoreError),
}

impl GenerationError {
    /// Errores que provienen de una llamada al modelo y se reintentan
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Api { .. }
                | GenerationError::Network(_)
                | GenerationError::EmptyResponse
                | GenerationError::MalformedJson(_)
        )
    }
}
