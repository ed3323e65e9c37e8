//! # Sistema de Jobs
//! src/jobs/mod.rs
//!
//! Cada pedido de itinerario es un job que vive en el store desde que se
//! acepta hasta que termina (`completed` o `failed`).
//!
//! ## Endpoints
//!
//! - `POST /generate` - Crear job y lanzar la generación
//! - `GET /status/{jobId}` - Consultar estado y resultado

pub mod firestore;
pub mod handlers;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use firestore::FirestoreStore;
pub use pipeline::Pipeline;
pub use storage::{FileStore, JobStore, MemoryStore, StoreError};
pub use types::{Activity, DayPlan, Job, JobStatus};
