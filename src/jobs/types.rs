//! # Tipos del Sistema de Jobs
//! src/jobs/types.rs
//!
//! Define el registro persistido de un job de itinerario y su ciclo de vida.
//! El JSON usa nombres camelCase porque es lo que devuelve `/status/{jobId}`.

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Longitud del sufijo aleatorio de los IDs
const ID_SUFFIX_LEN: usize = 9;

/// Estado de un job
///
/// `processing` es el único estado no terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

/// Una actividad dentro de un día (Morning / Afternoon / Evening)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub time: String,
    pub description: String,
    pub location: String,
}

/// Plan de un día del itinerario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Número de día, empezando en 1
    pub day: u32,
    pub theme: String,
    pub activities: Vec<Activity>,
}

/// Registro persistido de un job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub destination: String,
    pub duration_days: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub itinerary: Vec<DayPlan>,
    pub error: Option<String>,
}

impl Job {
    /// Crea un job nuevo en estado `processing` con un ID recién generado
    pub fn new(destination: &str, duration_days: u32) -> Self {
        Self::with_id(generate_job_id(), destination, duration_days)
    }

    /// Crea un job con un ID dado
    pub fn with_id(id: String, destination: &str, duration_days: u32) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            destination: destination.to_string(),
            duration_days,
            created_at: Utc::now(),
            completed_at: None,
            itinerary: Vec::new(),
            error: None,
        }
    }

    /// Marca el job como en proceso. No hace nada si ya es terminal.
    pub fn mark_processing(&mut self) {
        if !self.is_terminal() {
            self.status = JobStatus::Processing;
        }
    }

    /// Marca el job como completado con su itinerario
    pub fn mark_completed(&mut self, itinerary: Vec<DayPlan>) {
        self.status = JobStatus::Completed;
        self.itinerary = itinerary;
        self.error = None;
        self.completed_at = Some(Utc::now());
    }

    /// Marca el job como fallido. El itinerario queda vacío.
    pub fn mark_failed(&mut self, error: String) {
        self.status = JobStatus::Failed;
        self.itinerary.clear();
        self.error = Some(error);
        self.completed_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Genera un ID: timestamp en milisegundos + sufijo aleatorio en minúsculas
///
/// No es único de forma global; dos jobs creados en el mismo milisegundo sólo
/// se distinguen por el sufijo.
pub fn generate_job_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();

    format!("{}{}", Utc::now().timestamp_millis(), suffix)
}
