//! # Generación de Itinerarios
//! src/generation/mod.rs
//!
//! Todo lo que rodea la llamada al modelo:
//!
//! - `prompt`: texto que pide el itinerario en JSON
//! - `client`: cliente HTTP del servicio de generación
//! - `retry`: reintentos con backoff exponencial
//! - `schema`: validación del JSON devuelto

pub mod client;
pub mod error;
pub mod prompt;
pub mod retry;
pub mod schema;

pub use client::{CompletionClient, OpenAiClient};
pub use error::GenerationError;
pub use retry::RetryPolicy;
pub use schema::{validate_itinerary, ValidationError};
