//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor TCP que maneja múltiples conexiones simultáneas usando threads.
//! Cada conexión se procesa en su propio thread y se cierra tras responder.

use crate::config::Config;
use crate::context::AppContext;
use crate::error::Error;
use crate::http::{ParseError, Request, Response, StatusCode};
use crate::router::{add_common_headers, Router};
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Tamaño máximo aceptado para un request (headers + body)
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Servidor HTTP/1.0 concurrente
pub struct Server {
    address: String,
    router: Arc<Router>,
    context: Arc<AppContext>,
}

/// Resultado de leer un request del socket
enum Incoming {
    Closed,
    Complete(Vec<u8>),
    TooLarge,
}

impl Server {
    pub fn new(address: impl Into<String>, context: AppContext) -> Self {
        Self {
            address: address.into(),
            router: Arc::new(Router::with_api_routes()),
            context: Arc::new(context),
        }
    }

    /// Construye el servidor con el store y el cliente del modelo configurados
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let context = AppContext::from_config(config)?;
        Ok(Self::new(config.address(), context))
    }

    pub fn bind(&self) -> io::Result<TcpListener> {
        TcpListener::bind(&self.address)
    }

    pub fn run(&self) -> Result<(), Error> {
        let listener = self.bind()?;
        info!(address = %self.address, "server listening");
        self.serve(listener)?;
        Ok(())
    }

    /// Acepta conexiones hasta que el listener falle; un thread por conexión
    pub fn serve(&self, listener: TcpListener) -> io::Result<()> {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let context = Arc::clone(&self.context);

                    let peer_addr = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    debug!(peer = %peer_addr, "connection accepted");

                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, &router, &context) {
                            warn!(peer = %peer_addr, error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }

    fn handle_connection(mut stream: TcpStream, router: &Router, context: &AppContext) -> io::Result<()> {
        let start = Instant::now();
        let request_id = format!("{:016x}", rand::random::<u64>());
        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        let buffer = match read_request(&mut stream)? {
            Incoming::Closed => {
                debug!("connection closed before request");
                return Ok(());
            }
            Incoming::TooLarge => {
                warn!(%request_id, limit = MAX_REQUEST_BYTES, "request too large");
                let mut response = Response::error(
                    StatusCode::BadRequest,
                    &format!("Invalid request: request exceeds {} bytes", MAX_REQUEST_BYTES),
                );
                add_common_headers(&mut response);
                return send(&mut stream, response, &request_id);
            }
            Incoming::Complete(buffer) => buffer,
        };

        let (response, method, path) = match Request::parse(&buffer) {
            Ok(request) => {
                debug!(
                    %request_id,
                    method = request.method().as_str(),
                    path = %request.path(),
                    version = request.version(),
                    "request"
                );
                let response = router.route(&request, context);
                (response, request.method().as_str(), request.path().to_string())
            }
            // Un método desconocido es una ruta que no existe, no un request mal formado
            Err(ParseError::UnsupportedMethod(method)) => {
                debug!(%request_id, %method, "unsupported method");
                let mut response = Response::error(StatusCode::NotFound, "Endpoint not found");
                add_common_headers(&mut response);
                (response, "-", "-".to_string())
            }
            Err(e) => {
                warn!(%request_id, error = %e, "parse error");
                let mut response = Response::error(StatusCode::BadRequest, &format!("Invalid request: {}", e));
                add_common_headers(&mut response);
                (response, "-", "-".to_string())
            }
        };

        let status = response.status();
        send(&mut stream, response, &request_id)?;

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        if status.is_server_error() {
            warn!(%request_id, method, %path, status = status.as_u16(), latency_ms, "request failed");
        } else {
            info!(%request_id, method, %path, status = status.as_u16(), latency_ms, "request served");
        }

        Ok(())
    }
}

/// Lee hasta tener headers + `Content-Length` bytes de body, o hasta EOF
fn read_request(stream: &mut TcpStream) -> io::Result<Incoming> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);

        if buffer.len() > MAX_REQUEST_BYTES {
            return Ok(Incoming::TooLarge);
        }
        if let Some(expected) = Request::expected_len(&buffer) {
            if expected > MAX_REQUEST_BYTES {
                return Ok(Incoming::TooLarge);
            }
            if buffer.len() >= expected {
                break;
            }
        }
    }

    if buffer.is_empty() {
        Ok(Incoming::Closed)
    } else {
        Ok(Incoming::Complete(buffer))
    }
}

fn send(stream: &mut TcpStream, mut response: Response, request_id: &str) -> io::Result<()> {
    response.add_header("X-Request-Id", request_id);
    stream.write_all(&response.to_bytes())?;
    stream.flush()
}
