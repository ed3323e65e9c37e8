//! # Almacenamiento de Jobs
//! src/jobs/storage.rs
//!
//! El store se trata como un mapa `id → registro` con lectura y escritura
//! atómicas de un solo documento. Hay tres backends:
//!
//! - [`MemoryStore`]: mapa en memoria (tests y desarrollo local)
//! - [`FileStore`]: mapa en memoria persistido en un archivo JSON
//! - [`FirestoreStore`](crate::jobs::firestore::FirestoreStore): documentos en Cloud Firestore
//!
//! Todos rechazan sobrescribir un job que ya está en estado terminal.

use crate::jobs::types::Job;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

/// Errores del almacenamiento de jobs
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("document store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("document store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("job {0} is already final and cannot be modified")]
    Finalized(String),

    #[error("job storage lock poisoned")]
    Poisoned,
}

/// Mapa persistente de jobs
pub trait JobStore: Send + Sync {
    /// Guarda o reemplaza un job. Falla con [`StoreError::Finalized`] si el
    /// registro guardado ya es terminal.
    fn save(&self, job: &Job) -> Result<(), StoreError>;

    /// Obtiene un job por ID
    fn get(&self, job_id: &str) -> Result<Option<Job>, StoreError>;
}

fn check_not_final(existing: Option<&Job>) -> Result<(), StoreError> {
    match existing {
        Some(job) if job.is_terminal() => Err(StoreError::Finalized(job.id.clone())),
        _ => Ok(()),
    }
}

/// Store en memoria
#[derive(Default)]
pub struct MemoryStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de jobs almacenados
    pub fn count(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Job>>, StoreError> {
        self.jobs.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl JobStore for MemoryStore {
    fn save(&self, job: &Job) -> Result<(), StoreError> {
        let mut jobs = self.lock()?;
        check_not_final(jobs.get(&job.id))?;
        jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    fn get(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        Ok(self.lock()?.get(job_id).cloned())
    }
}

/// Store persistido en un archivo JSON
///
/// Mantiene una copia en memoria y reescribe el archivo completo en cada
/// `save` usando un archivo temporal + rename.
pub struct FileStore {
    path: PathBuf,
    jobs: Mutex<HashMap<String, Job>>,
}

impl FileStore {
    /// Abre el store y carga los jobs existentes
    ///
    /// Un archivo corrupto se descarta y el store empieza vacío.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let jobs = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), jobs = jobs.len(), "FileStore::open");

        Ok(Self {
            path,
            jobs: Mutex::new(jobs),
        })
    }

    fn load_from_file(path: &Path) -> Result<HashMap<String, Job>, StoreError> {
        let reader = BufReader::new(File::open(path)?);

        match serde_json::from_reader(reader) {
            Ok(jobs) => Ok(jobs),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "job storage file is corrupt, starting empty");
                Ok(HashMap::new())
            }
        }
    }

    fn save_to_file(&self, jobs: &HashMap<String, Job>) -> Result<(), StoreError> {
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, jobs)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Número de jobs almacenados
    pub fn count(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }
}

impl JobStore for FileStore {
    fn save(&self, job: &Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.lock().map_err(|_| StoreError::Poisoned)?;
        check_not_final(jobs.get(&job.id))?;

        let previous = jobs.insert(job.id.clone(), job.clone());

        // Si no se pudo escribir el archivo, la copia en memoria vuelve a su estado anterior
        if let Err(e) = self.save_to_file(&jobs) {
            match previous {
                Some(previous) => jobs.insert(job.id.clone(), previous),
                None => jobs.remove(&job.id),
            };
            return Err(e);
        }

        Ok(())
    }

    fn get(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        let jobs = self.jobs.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(jobs.get(job_id).cloned())
    }
}
