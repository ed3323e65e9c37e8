//! # Pipeline de Generación
//! src/jobs/pipeline.rs
//!
//! Lleva un job de `processing` a `completed` o `failed`:
//!
//! 1. Marca el job `processing` (ya lo está) y lo guarda
//! 2. Construye el prompt
//! 3. Llama al modelo con reintentos y parsea el JSON
//! 4. Valida el itinerario
//! 5. Guarda el estado terminal (itinerario completo o mensaje de error)
//!
//! Cada job corre en su propio thread, sin esperar a la respuesta HTTP.

use crate::generation::prompt::build_prompt;
use crate::generation::{validate_itinerary, CompletionClient, GenerationError, RetryPolicy};
use crate::jobs::storage::JobStore;
use crate::jobs::types::{DayPlan, Job};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

type SleepFn = Arc<dyn Fn(Duration) + Send + Sync>;

/// Pipeline compartido por todos los jobs del proceso
pub struct Pipeline {
    store: Arc<dyn JobStore>,
    client: Arc<dyn CompletionClient>,
    policy: RetryPolicy,
    sleep: SleepFn,
}

impl Pipeline {
    pub fn new(store: Arc<dyn JobStore>, client: Arc<dyn CompletionClient>, policy: RetryPolicy) -> Self {
        Self {
            store,
            client,
            policy,
            sleep: Arc::new(thread::sleep),
        }
    }

    /// Reemplaza la función de espera entre reintentos
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Arc::new(sleep);
        self
    }

    /// Lanza el pipeline en un thread propio y retorna de inmediato
    pub fn spawn(self: &Arc<Self>, job: Job) -> std::io::Result<JoinHandle<Job>> {
        let pipeline = Arc::clone(self);
        thread::Builder::new()
            .name(format!("itinerary-{}", job.id))
            .spawn(move || pipeline.run(job))
    }

    /// Ejecuta el pipeline completo y retorna el job tal como quedó
    ///
    /// Si la escritura final falla, el job retornado refleja el estado
    /// calculado aunque el store siga en `processing`.
    pub fn run(&self, mut job: Job) -> Job {
        info!(job_id = %job.id, destination = %job.destination, days = job.duration_days, "generation started");

        job.mark_processing();
        let outcome = self
            .store
            .save(&job)
            .map_err(GenerationError::from)
            .and_then(|_| self.generate(&job));

        match outcome {
            Ok(itinerary) => {
                job.mark_completed(itinerary);
                info!(job_id = %job.id, "generation completed");
            }
            Err(e) => {
                job.mark_failed(e.to_string());
                error!(job_id = %job.id, error = %e, "generation failed");
            }
        }

        if let Err(e) = self.store.save(&job) {
            error!(job_id = %job.id, error = %e, "failed to store terminal job state");
        }

        job
    }

    fn generate(&self, job: &Job) -> Result<Vec<DayPlan>, GenerationError> {
        let prompt = build_prompt(&job.destination, job.duration_days);

        let value = self.policy.run(self.sleep.as_ref(), |attempt| {
            debug!(job_id = %job.id, attempt, "calling generation service");
            let content = self.client.complete(&prompt)?;
            let value: serde_json::Value = serde_json::from_str(strip_code_fence(&content))?;
            Ok(value)
        })?;

        Ok(validate_itinerary(&value, job.duration_days)?)
    }
}

/// Quita un bloque ```json ... ``` alrededor del contenido, si lo hay
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
