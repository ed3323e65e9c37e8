//! # Reintentos con Backoff Exponencial
//! src/generation/retry.rs
//!
//! Cada intento fallido espera `base^intento` segundos (intentos desde 1).
//! Con la configuración por defecto (base 2, 3 intentos) las esperas son
//! 2s, 4s y 8s; el error del último intento se propaga tras su espera.

use crate::generation::error::GenerationError;
use std::time::Duration;
use tracing::warn;

/// Intentos totales por defecto
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base del backoff exponencial en segundos
pub const DEFAULT_BACKOFF_BASE_SECS: u64 = 2;

/// Política de reintentos de la llamada al modelo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_secs: DEFAULT_BACKOFF_BASE_SECS,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base_secs: u64) -> Self {
        Self { max_attempts, backoff_base_secs }
    }

    /// Espera después del intento `attempt` (1-based)
    ///
    /// # Ejemplo
    /// ```
    /// use itinerary_server::generation::retry::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.backoff(1), Duration::from_secs(2));
    /// assert_eq!(policy.backoff(3), Duration::from_secs(8));
    /// ```
    pub fn backoff(&self, attempt: u32) -> Duration {
        let secs = self
            .backoff_base_secs
            .checked_pow(attempt)
            .unwrap_or(u64::MAX);
        Duration::from_secs(secs)
    }

    /// Ejecuta `op` hasta que tenga éxito, falle con un error no reintentable,
    /// o se agoten los intentos.
    ///
    /// `sleep` se recibe como parámetro para que los tests no esperen de verdad.
    pub fn run<T, F>(&self, sleep: &dyn Fn(Duration), mut op: F) -> Result<T, GenerationError>
    where
        F: FnMut(u32) -> Result<T, GenerationError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => error,
            };

            let delay = self.backoff(attempt);
            warn!(
                attempt,
                max_attempts,
                backoff_secs = delay.as_secs(),
                error = %error,
                "generation attempt failed"
            );
            sleep(delay);

            if attempt >= max_attempts {
                return Err(error);
            }
            attempt += 1;
        }
    }
}
