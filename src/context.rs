//! # Contexto de la Aplicación
//! src/context.rs
//!
//! Clientes compartidos por todas las conexiones. Se construyen una sola vez
//! al arrancar el proceso.

use crate::config::{Config, StoreBackend};
use crate::error::Error;
use crate::generation::{CompletionClient, OpenAiClient, RetryPolicy};
use crate::jobs::firestore::FirestoreStore;
use crate::jobs::pipeline::Pipeline;
use crate::jobs::storage::{FileStore, JobStore, MemoryStore};
use std::sync::Arc;
use tracing::info;

/// Estado compartido entre handlers
pub struct AppContext {
    pub store: Arc<dyn JobStore>,
    pub pipeline: Arc<Pipeline>,
}

impl AppContext {
    pub fn new(store: Arc<dyn JobStore>, client: Arc<dyn CompletionClient>, policy: RetryPolicy) -> Self {
        let pipeline = Pipeline::new(Arc::clone(&store), client, policy);
        Self::with_pipeline(store, pipeline)
    }

    pub fn with_pipeline(store: Arc<dyn JobStore>, pipeline: Pipeline) -> Self {
        Self {
            store,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Construye el store y el cliente del modelo según la configuración
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let store = build_store(config)?;
        let client = OpenAiClient::new(&config.openai_api_key, &config.openai_base_url, &config.openai_model)?;

        Ok(Self::new(store, Arc::new(client), config.retry_policy()))
    }
}

fn build_store(config: &Config) -> Result<Arc<dyn JobStore>, Error> {
    let store: Arc<dyn JobStore> = match config.store {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::open(&config.jobs_storage_path)?),
        StoreBackend::Firestore => Arc::new(FirestoreStore::new(
            &config.firestore_base_url,
            config.firestore_project.as_deref().unwrap_or_default(),
            &config.firestore_collection,
            config.firestore_token.as_deref().unwrap_or_default(),
        )?),
    };

    info!(backend = config.store.as_str(), "job store ready");
    Ok(store)
}
