//! Tests de integración para el servidor HTTP
//! tests/integration_test.rs
//!
//! Cada test levanta un servidor real en un puerto efímero, con store en
//! memoria y un modelo de lenguaje falso, y le habla por TCP.

use itinerary_server::context::AppContext;
use itinerary_server::generation::{CompletionClient, GenerationError, RetryPolicy};
use itinerary_server::jobs::MemoryStore;
use itinerary_server::server::Server;
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Modelo falso que responde siempre un itinerario de `days` días
struct FixedPlanner {
    days: u32,
}

impl CompletionClient for FixedPlanner {
    fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        let days: Vec<Value> = (1..=self.days)
            .map(|day| {
                json!({
                    "day": day,
                    "theme": format!("Neighbourhood walk {}", day),
                    "activities": [
                        { "time": "Morning", "description": "Market breakfast", "location": "Old Town" },
                        { "time": "Afternoon", "description": "Castle visit", "location": "Hilltop" },
                        { "time": "Evening", "description": "River dinner", "location": "Waterfront" }
                    ]
                })
            })
            .collect();
        Ok(json!({ "itinerary": days }).to_string())
    }
}

/// Modelo falso que siempre falla con un error reintentable
#[derive(Default)]
struct DownModel {
    calls: AtomicU32,
}

impl CompletionClient for DownModel {
    fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::Api { status: 503, message: "service unavailable".to_string() })
    }
}

/// Levanta el servidor y retorna su dirección
fn start_server(client: Arc<dyn CompletionClient>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let context = AppContext::new(Arc::new(MemoryStore::new()), client, RetryPolicy::new(3, 0));
    let server = Server::new(addr.to_string(), context);

    thread::spawn(move || server.serve(listener));
    addr
}

struct HttpReply {
    status: u16,
    head: String,
    body: String,
}

impl HttpReply {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Helper: envía un request HTTP crudo y retorna la response completa
fn send_raw(addr: SocketAddr, raw: &str) -> HttpReply {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(raw.as_bytes()).unwrap();
    stream.flush().unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    let (head, body) = response.split_once("\r\n\r\n").unwrap_or((response.as_str(), ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);

    HttpReply {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

fn get(addr: SocketAddr, path: &str) -> HttpReply {
    send_raw(addr, &format!("GET {} HTTP/1.0\r\n\r\n", path))
}

fn post_generate(addr: SocketAddr, body: &str) -> HttpReply {
    send_raw(
        addr,
        &format!(
            "POST /generate HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        ),
    )
}

/// Consulta `/status/{id}` hasta que el job deje de estar en `processing`
fn wait_terminal(addr: SocketAddr, job_id: &str) -> Value {
    let deadline = Instant::now() + Duration::from_secs(10);

    loop {
        let job = get(addr, &format!("/status/{}", job_id)).json();
        if job["status"] != "processing" {
            return job;
        }
        assert!(Instant::now() < deadline, "job {} never finished", job_id);
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_generate_returns_job_id_and_record_is_readable() {
    let addr = start_server(Arc::new(FixedPlanner { days: 3 }));

    let reply = post_generate(addr, r#"{"destination":"Porto","durationDays":3}"#);

    assert_eq!(reply.status, 202, "got: {}", reply.head);
    let body = reply.json();
    assert_eq!(body["message"], "Itinerary generation started");
    let job_id = body["jobId"].as_str().unwrap();
    assert!(!job_id.is_empty());

    let status = get(addr, &format!("/status/{}", job_id));
    assert_eq!(status.status, 200);
    let job = status.json();
    assert_eq!(job["id"], job_id);
    assert_eq!(job["destination"], "Porto");
    assert_eq!(job["durationDays"], 3);
    assert!(job["createdAt"].is_string());
}

#[test]
fn test_completed_job_has_full_itinerary_and_is_stable() {
    let addr = start_server(Arc::new(FixedPlanner { days: 2 }));

    let job_id = post_generate(addr, r#"{"destination":"Seville","durationDays":2}"#).json()["jobId"]
        .as_str()
        .unwrap()
        .to_string();

    let job = wait_terminal(addr, &job_id);
    assert_eq!(job["status"], "completed");
    assert!(job["completedAt"].is_string());
    assert!(job.get("error").map_or(true, Value::is_null));

    let days = job["itinerary"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    for (i, day) in days.iter().enumerate() {
        assert_eq!(day["day"], i as u64 + 1);
        let activities = day["activities"].as_array().unwrap();
        assert_eq!(activities.len(), 3);
        for activity in activities {
            for field in ["time", "description", "location"] {
                assert!(!activity[field].as_str().unwrap().is_empty());
            }
        }
    }

    let again = get(addr, &format!("/status/{}", job_id)).json();
    assert_eq!(again, job);
}

#[test]
fn test_failed_job_has_error_and_empty_itinerary() {
    let model = Arc::new(DownModel::default());
    let addr = start_server(model.clone());

    let job_id = post_generate(addr, r#"{"destination":"Oslo","durationDays":1}"#).json()["jobId"]
        .as_str()
        .unwrap()
        .to_string();

    let job = wait_terminal(addr, &job_id);
    assert_eq!(job["status"], "failed");
    assert!(!job["error"].as_str().unwrap().is_empty());
    assert_eq!(job["itinerary"], json!([]));
    assert_eq!(model.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_generate_rejects_invalid_input() {
    let addr = start_server(Arc::new(FixedPlanner { days: 1 }));

    for body in [
        r#"{"destination":"Rome","durationDays":0}"#,
        r#"{"destination":"Rome","durationDays":31}"#,
        r#"{"destination":"Rome","durationDays":"three"}"#,
        r#"{"durationDays":3}"#,
        "not json",
    ] {
        let reply = post_generate(addr, body);
        assert_eq!(reply.status, 400, "body: {}", body);
        assert!(reply.json()["error"].is_string());
    }
}

#[test]
fn test_status_unknown_and_missing_id() {
    let addr = start_server(Arc::new(FixedPlanner { days: 1 }));

    let reply = get(addr, "/status/does-not-exist");
    assert_eq!(reply.status, 404);
    assert_eq!(reply.json()["error"], "Job not found");

    let reply = get(addr, "/status/");
    assert_eq!(reply.status, 400);
    assert_eq!(reply.json()["error"], "Job ID is required");
}

#[test]
fn test_options_returns_cors_headers_without_body() {
    let addr = start_server(Arc::new(FixedPlanner { days: 1 }));

    let reply = send_raw(addr, "OPTIONS /generate HTTP/1.1\r\nOrigin: http://localhost:3000\r\n\r\n");

    assert_eq!(reply.status, 200);
    assert!(reply.body.is_empty());
    assert!(reply.head.contains("Access-Control-Allow-Origin: *"));
    assert!(reply.head.contains("Access-Control-Allow-Methods: GET, POST, OPTIONS"));
    assert!(reply.head.contains("Access-Control-Allow-Headers: Content-Type"));
}

#[test]
fn test_every_response_has_cors_and_request_id() {
    let addr = start_server(Arc::new(FixedPlanner { days: 1 }));

    for reply in [
        get(addr, "/"),
        get(addr, "/nope"),
        get(addr, "/status/unknown"),
        post_generate(addr, "{}"),
    ] {
        assert!(reply.head.contains("Access-Control-Allow-Origin: *"), "{}", reply.head);
        assert!(reply.head.contains("X-Request-Id:"));
        assert!(reply.head.contains("Connection: close"));
    }
}

#[test]
fn test_unknown_paths_are_not_found() {
    let addr = start_server(Arc::new(FixedPlanner { days: 1 }));

    for reply in [get(addr, "/metrics"), get(addr, "/generate"), send_raw(addr, "PUT /status/x HTTP/1.0\r\n\r\n")] {
        assert_eq!(reply.status, 404);
        assert_eq!(reply.json()["error"], "Endpoint not found");
    }
}

#[test]
fn test_unknown_methods_are_not_found() {
    let addr = start_server(Arc::new(FixedPlanner { days: 1 }));

    for raw in ["TRACE /anything HTTP/1.1\r\n\r\n", "CONNECT /generate HTTP/1.1\r\n\r\n", "get / HTTP/1.0\r\n\r\n"] {
        let reply = send_raw(addr, raw);
        assert_eq!(reply.status, 404, "request: {:?}", raw);
        assert_eq!(reply.json()["error"], "Endpoint not found");
        assert!(reply.head.contains("Access-Control-Allow-Origin: *"));
    }
}

#[test]
fn test_huge_content_length_gets_bad_request() {
    let addr = start_server(Arc::new(FixedPlanner { days: 1 }));

    let reply = send_raw(addr, &format!("POST /generate HTTP/1.1\r\nContent-Length: {}\r\n\r\n", usize::MAX));

    assert_eq!(reply.status, 400);
    assert!(reply.json()["error"].as_str().unwrap().starts_with("Invalid request:"));
}

#[test]
fn test_concurrent_jobs_are_independent() {
    let addr = start_server(Arc::new(FixedPlanner { days: 1 }));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                let body = format!(r#"{{"destination":"City {}","durationDays":1}}"#, i);
                let job_id = post_generate(addr, &body).json()["jobId"].as_str().unwrap().to_string();
                (i, wait_terminal(addr, &job_id))
            })
        })
        .collect();

    for handle in handles {
        let (i, job) = handle.join().unwrap();
        assert_eq!(job["status"], "completed");
        assert_eq!(job["destination"], format!("City {}", i));
    }
}
