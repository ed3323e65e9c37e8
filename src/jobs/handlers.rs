//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! - `GET /` - descripción de la API
//! - `POST /generate` - crea un job y lanza la generación
//! - `GET /status/{jobId}` - estado actual del job

use crate::context::AppContext;
use crate::error::ApiError;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::types::Job;
use crate::router::PathParams;
use serde_json::{json, Value};
use tracing::info;

/// Rango válido de `durationDays`
pub const MIN_DURATION_DAYS: u32 = 1;
pub const MAX_DURATION_DAYS: u32 = 30;

const INVALID_BODY: &str = "Request body must be a JSON object";
const MISSING_DESTINATION: &str = "destination is required";
const INVALID_DURATION: &str = "durationDays must be a number between 1 and 30";

/// Handler para `GET /`
pub fn index_handler(_req: &Request, _ctx: &AppContext, _params: &PathParams) -> Result<Response, ApiError> {
    let body = json!({
        "name": "Travel Itinerary Generator API",
        "endpoints": {
            "POST /generate": "Start itinerary generation. Body: {\"destination\": string, \"durationDays\": 1-30}",
            "GET /status/{jobId}": "Get the status and result of a generation job",
        }
    });

    Ok(Response::json(StatusCode::Ok, &body))
}

/// Handler para `POST /generate`
///
/// # Ejemplo de response (202)
/// ```json
/// {"jobId": "1760745600000k3j9x2m1q", "message": "Itinerary generation started"}
/// ```
pub fn generate_handler(req: &Request, ctx: &AppContext, _params: &PathParams) -> Result<Response, ApiError> {
    let (destination, duration_days) = parse_generate_body(req.body())?;

    let job = Job::new(&destination, duration_days);
    ctx.store.save(&job)?;

    info!(job_id = %job.id, %destination, duration_days, "job created");

    let job_id = job.id.clone();
    // El handle se descarta: el cliente consulta el resultado con /status
    ctx.pipeline
        .spawn(job)
        .map_err(|e| ApiError::Internal(format!("failed to start generation: {}", e)))?;

    let body = json!({
        "jobId": job_id,
        "message": "Itinerary generation started",
    });

    Ok(Response::json(StatusCode::Accepted, &body))
}

/// Handler para `GET /status/{jobId}`
///
/// Retorna el registro completo del job tal como está guardado.
pub fn status_handler(_req: &Request, ctx: &AppContext, params: &PathParams) -> Result<Response, ApiError> {
    let job_id = params
        .get("jobId")
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Job ID is required".to_string()))?;

    // Los IDs válidos nunca tienen caracteres que cambien la URL del store
    if !is_valid_job_id(job_id) {
        return Err(ApiError::NotFound("Job not found".to_string()));
    }

    let job = ctx
        .store
        .get(job_id)?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    let body = serde_json::to_value(&job).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Response::json(StatusCode::Ok, &body))
}

fn is_valid_job_id(job_id: &str) -> bool {
    job_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Valida el body de `/generate` y retorna `(destination, durationDays)`
fn parse_generate_body(body: &[u8]) -> Result<(String, u32), ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::BadRequest(INVALID_BODY.to_string()))?;
    let fields = value
        .as_object()
        .ok_or_else(|| ApiError::BadRequest(INVALID_BODY.to_string()))?;

    let destination = fields
        .get("destination")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING_DESTINATION.to_string()))?;

    let duration_days = fields
        .get("durationDays")
        .and_then(parse_duration)
        .ok_or_else(|| ApiError::BadRequest(INVALID_DURATION.to_string()))?;

    Ok((destination.to_string(), duration_days))
}

/// Números enteros dentro del rango, también escritos como `3.0`;
/// `"3"` o `2.5` no cuentan
fn parse_duration(value: &Value) -> Option<u32> {
    let days = match value.as_u64() {
        Some(n) => u32::try_from(n).ok()?,
        None => {
            let n = value.as_f64()?;
            if n.fract() != 0.0 || !(MIN_DURATION_DAYS as f64..=MAX_DURATION_DAYS as f64).contains(&n) {
                return None;
            }
            n as u32
        }
    };
    (MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&days).then_some(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{CompletionClient, GenerationError, RetryPolicy};
    use crate::error::INTERNAL_ERROR_MESSAGE;
    use crate::jobs::storage::{JobStore, MemoryStore, StoreError};
    use crate::jobs::types::JobStatus;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct UnavailableModel;

    impl CompletionClient for UnavailableModel {
        fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Api { status: 503, message: "unavailable".to_string() })
        }
    }

    /// Modelo que cuenta las llamadas recibidas
    #[derive(Default)]
    struct CountingModel {
        calls: AtomicU32,
    }

    impl CompletionClient for CountingModel {
        fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::EmptyResponse)
        }
    }

    /// Store que rechaza toda escritura
    struct ReadOnlyStore;

    impl JobStore for ReadOnlyStore {
        fn save(&self, _job: &Job) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }

        fn get(&self, _job_id: &str) -> Result<Option<Job>, StoreError> {
            Ok(None)
        }
    }

    fn context() -> (Arc<MemoryStore>, AppContext) {
        let store = Arc::new(MemoryStore::new());
        let ctx = AppContext::new(store.clone(), Arc::new(UnavailableModel), RetryPolicy::new(1, 0));
        (store, ctx)
    }

    fn post(body: &str) -> Request {
        let raw = format!(
            "POST /generate HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        Request::parse(raw.as_bytes()).unwrap()
    }

    fn get(path: &str) -> Request {
        Request::parse(format!("GET {} HTTP/1.0\r\n\r\n", path).as_bytes()).unwrap()
    }

    fn params(job_id: Option<&str>) -> PathParams {
        let mut params = PathParams::default();
        if let Some(id) = job_id {
            params.insert("jobId", id);
        }
        params
    }

    fn error_message(result: Result<Response, ApiError>) -> (StatusCode, String) {
        let err = result.unwrap_err();
        (err.status(), err.to_string())
    }

    #[test]
    fn test_generate_accepts_valid_request() {
        let (store, ctx) = context();

        let response = generate_handler(&post(r#"{"destination":"Lisbon","durationDays":3}"#), &ctx, &params(None)).unwrap();

        assert_eq!(response.status(), StatusCode::Accepted);
        let body = response.body_json().unwrap();
        let job_id = body["jobId"].as_str().unwrap();
        assert!(!job_id.is_empty());
        assert_eq!(body["message"], "Itinerary generation started");

        let job = store.get(job_id).unwrap().unwrap();
        assert_eq!(job.destination, "Lisbon");
        assert_eq!(job.duration_days, 3);
    }

    #[test]
    fn test_generate_rejects_out_of_range_duration() {
        let (_, ctx) = context();

        for body in [
            r#"{"destination":"Lisbon","durationDays":0}"#,
            r#"{"destination":"Lisbon","durationDays":31}"#,
            r#"{"destination":"Lisbon","durationDays":"three"}"#,
            r#"{"destination":"Lisbon","durationDays":2.5}"#,
            r#"{"destination":"Lisbon","durationDays":-3}"#,
            r#"{"destination":"Lisbon"}"#,
        ] {
            let (status, message) = error_message(generate_handler(&post(body), &ctx, &params(None)));
            assert_eq!(status, StatusCode::BadRequest, "body: {}", body);
            assert_eq!(message, INVALID_DURATION);
        }
    }

    #[test]
    fn test_generate_rejects_missing_destination() {
        let (store, ctx) = context();

        for body in [r#"{"durationDays":3}"#, r#"{"destination":"   ","durationDays":3}"#, r#"{"destination":7,"durationDays":3}"#] {
            let (status, message) = error_message(generate_handler(&post(body), &ctx, &params(None)));
            assert_eq!(status, StatusCode::BadRequest);
            assert_eq!(message, MISSING_DESTINATION);
        }
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_generate_rejects_invalid_json() {
        let (_, ctx) = context();

        for body in ["not json", "[1,2]", ""] {
            let (status, message) = error_message(generate_handler(&post(body), &ctx, &params(None)));
            assert_eq!(status, StatusCode::BadRequest);
            assert_eq!(message, INVALID_BODY);
        }
    }

    #[test]
    fn test_generate_store_failure_is_internal_error() {
        let model = Arc::new(CountingModel::default());
        let ctx = AppContext::new(Arc::new(ReadOnlyStore), model.clone(), RetryPolicy::new(1, 0));

        let err = generate_handler(&post(r#"{"destination":"Lisbon","durationDays":3}"#), &ctx, &params(None))
            .unwrap_err();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert_eq!(response.body_json().unwrap()["error"], INTERNAL_ERROR_MESSAGE);
        // Sin registro inicial no se lanza el pipeline
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_generate_accepts_integral_float_duration() {
        let (store, ctx) = context();

        let response = generate_handler(&post(r#"{"destination":"Lisbon","durationDays":3.0}"#), &ctx, &params(None)).unwrap();

        assert_eq!(response.status(), StatusCode::Accepted);
        let job_id = response.body_json().unwrap()["jobId"].as_str().unwrap().to_string();
        assert_eq!(store.get(&job_id).unwrap().unwrap().duration_days, 3);

        for body in [
            r#"{"destination":"Lisbon","durationDays":0.0}"#,
            r#"{"destination":"Lisbon","durationDays":31.0}"#,
            r#"{"destination":"Lisbon","durationDays":1e10}"#,
        ] {
            let (status, _) = error_message(generate_handler(&post(body), &ctx, &params(None)));
            assert_eq!(status, StatusCode::BadRequest, "body: {}", body);
        }
    }

    #[test]
    fn test_generate_accepts_range_bounds() {
        let (_, ctx) = context();

        for days in [MIN_DURATION_DAYS, MAX_DURATION_DAYS] {
            let body = format!(r#"{{"destination":"Lima","durationDays":{}}}"#, days);
            let response = generate_handler(&post(&body), &ctx, &params(None)).unwrap();
            assert_eq!(response.status(), StatusCode::Accepted);
        }
    }

    #[test]
    fn test_status_missing_id() {
        let (_, ctx) = context();

        let (status, message) = error_message(status_handler(&get("/status/"), &ctx, &params(Some(""))));
        assert_eq!(status, StatusCode::BadRequest);
        assert_eq!(message, "Job ID is required");

        let (status, _) = error_message(status_handler(&get("/status"), &ctx, &params(None)));
        assert_eq!(status, StatusCode::BadRequest);
    }

    #[test]
    fn test_status_not_found() {
        let (_, ctx) = context();

        let (status, message) = error_message(status_handler(&get("/status/nope"), &ctx, &params(Some("nope"))));
        assert_eq!(status, StatusCode::NotFound);
        assert_eq!(message, "Job not found");
    }

    #[test]
    fn test_status_rejects_ids_outside_charset() {
        let (store, ctx) = context();
        store.save(&Job::with_id("ok_id-1".to_string(), "Cusco", 1)).unwrap();

        for id in ["..", "a/b", "x?y", "id%2F", "café"] {
            let (status, message) = error_message(status_handler(&get("/status/x"), &ctx, &params(Some(id))));
            assert_eq!(status, StatusCode::NotFound, "id: {}", id);
            assert_eq!(message, "Job not found");
        }

        let response = status_handler(&get("/status/ok_id-1"), &ctx, &params(Some("ok_id-1"))).unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_status_returns_record() {
        let (store, ctx) = context();
        let mut job = Job::with_id("job-7".to_string(), "Cusco", 2);
        job.mark_failed("model unavailable".to_string());
        store.save(&job).unwrap();

        let response = status_handler(&get("/status/job-7"), &ctx, &params(Some("job-7"))).unwrap();

        assert_eq!(response.status(), StatusCode::Ok);
        let body = response.body_json().unwrap();
        assert_eq!(body["id"], "job-7");
        assert_eq!(body["status"], JobStatus::Failed.as_str());
        assert_eq!(body["error"], "model unavailable");
        assert_eq!(body["itinerary"], json!([]));
    }

    #[test]
    fn test_index_lists_endpoints() {
        let (_, ctx) = context();
        let response = index_handler(&get("/"), &ctx, &params(None)).unwrap();

        let body = response.body_json().unwrap();
        assert!(body["endpoints"]["POST /generate"].is_string());
        assert!(body["endpoints"]["GET /status/{jobId}"].is_string());
    }
}
