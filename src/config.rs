//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI o variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./itinerary_server --port 8080 \
//!   --store file \
//!   --jobs-storage ./data/jobs.json \
//!   --openai-api-key sk-...
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! OPENAI_API_KEY=sk-... JOB_STORE=firestore \
//!   FIRESTORE_PROJECT_ID=my-project FIRESTORE_ACCESS_TOKEN=ya29... \
//!   ./itinerary_server
//! ```

use crate::generation::RetryPolicy;
use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::info;

/// Backend donde se guardan los jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Sólo en memoria; se pierde al reiniciar
    Memory,
    /// Archivo JSON local
    File,
    /// Colección de documentos en Firestore
    Firestore,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::File => "file",
            StoreBackend::Firestore => "firestore",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OpenAI API key is required (--openai-api-key or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("firestore store requires {0}")]
    MissingFirestoreSetting(&'static str),

    #[error("jobs storage path must not be empty")]
    EmptyStoragePath,

    #[error("max attempts must be >= 1")]
    ZeroAttempts,
}

/// Configuración del servidor de itinerarios
#[derive(Debug, Clone, Parser)]
#[command(name = "itinerary_server")]
#[command(about = "Servidor HTTP que genera itinerarios de viaje en segundo plano")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Storage ===

    /// Backend de persistencia de jobs
    #[arg(long, value_enum, default_value = "file", env = "JOB_STORE")]
    pub store: StoreBackend,

    /// Ruta del archivo de persistencia de jobs (backend `file`)
    #[arg(long = "jobs-storage", default_value = "./data/jobs.json", env = "JOBS_STORAGE")]
    pub jobs_storage_path: String,

    /// Proyecto de Firestore
    #[arg(long = "firestore-project", env = "FIRESTORE_PROJECT_ID")]
    pub firestore_project: Option<String>,

    /// Token OAuth para la API REST de Firestore
    #[arg(long = "firestore-token", env = "FIRESTORE_ACCESS_TOKEN", hide_env_values = true)]
    pub firestore_token: Option<String>,

    /// Colección donde se guardan los documentos
    #[arg(long = "firestore-collection", default_value = "itineraries", env = "FIRESTORE_COLLECTION")]
    pub firestore_collection: String,

    /// URL base de la API de Firestore
    #[arg(
        long = "firestore-url",
        default_value = "https://firestore.googleapis.com/v1",
        env = "FIRESTORE_BASE_URL"
    )]
    pub firestore_base_url: String,

    // === Generación ===

    /// API key del servicio de generación
    #[arg(long = "openai-api-key", env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    pub openai_api_key: String,

    /// URL base compatible con Chat Completions
    #[arg(long = "openai-base-url", default_value = "https://api.openai.com", env = "OPENAI_BASE_URL")]
    pub openai_base_url: String,

    /// Modelo a usar
    #[arg(long = "openai-model", default_value = "gpt-4o-mini", env = "OPENAI_MODEL")]
    pub openai_model: String,

    /// Intentos máximos por job
    #[arg(long = "max-attempts", default_value = "3", env = "GENERATION_MAX_ATTEMPTS")]
    pub max_attempts: u32,

    /// Base del backoff exponencial en segundos (espera = base^intento)
    #[arg(long = "backoff-base-secs", default_value = "2", env = "GENERATION_BACKOFF_BASE")]
    pub backoff_base_secs: u64,

    /// Logs a nivel debug
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.backoff_base_secs)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        match self.store {
            StoreBackend::Memory => {}
            StoreBackend::File => {
                if self.jobs_storage_path.trim().is_empty() {
                    return Err(ConfigError::EmptyStoragePath);
                }
            }
            StoreBackend::Firestore => {
                if is_blank(&self.firestore_project) {
                    return Err(ConfigError::MissingFirestoreSetting("a project id"));
                }
                if is_blank(&self.firestore_token) {
                    return Err(ConfigError::MissingFirestoreSetting("an access token"));
                }
            }
        }

        Ok(())
    }

    /// Registra un resumen de la configuración sin secretos
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            store = self.store.as_str(),
            "server configuration"
        );

        match self.store {
            StoreBackend::Memory => {}
            StoreBackend::File => info!(path = %self.jobs_storage_path, "file store"),
            StoreBackend::Firestore => info!(
                project = self.firestore_project.as_deref().unwrap_or_default(),
                collection = %self.firestore_collection,
                token = %mask(self.firestore_token.as_deref().unwrap_or_default()),
                "firestore store"
            ),
        }

        info!(
            base_url = %self.openai_base_url,
            model = %self.openai_model,
            api_key = %mask(&self.openai_api_key),
            max_attempts = self.max_attempts,
            backoff_base_secs = self.backoff_base_secs,
            "generation service"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            store: StoreBackend::File,
            jobs_storage_path: "./data/jobs.json".to_string(),
            firestore_project: None,
            firestore_token: None,
            firestore_collection: "itineraries".to_string(),
            firestore_base_url: "https://firestore.googleapis.com/v1".to_string(),
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            max_attempts: 3,
            backoff_base_secs: 2,
            verbose: false,
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Deja visibles sólo los últimos 4 caracteres
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
