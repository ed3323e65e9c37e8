//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea método + path a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! Los patrones aceptan segmentos `:nombre` que se capturan en [`PathParams`].
//! Si no hay handler para el método y path, retorna 404.

use crate::context::AppContext;
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};
use crate::http::{Method, Request, Response, StatusCode};
use crate::jobs::handlers::{generate_handler, index_handler, status_handler};
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Tipo de función handler
///
/// Un handler recibe el Request, el contexto compartido y los parámetros del path
pub type Handler = fn(&Request, &AppContext, &PathParams) -> Result<Response, ApiError>;

/// Segmentos capturados por un patrón `:nombre`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(String, String)>,
}

impl PathParams {
    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.push((name.to_string(), value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    method: Method,
    pattern: Vec<String>,
    handler: Handler,
}

impl Route {
    fn matches(&self, method: Method, path: &str) -> Option<PathParams> {
        if self.method != method {
            return None;
        }

        let segments = split_path(path);
        if segments.len() != self.pattern.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (expected, actual) in self.pattern.iter().zip(segments) {
            match expected.strip_prefix(':') {
                Some(name) => params.insert(name, actual),
                None if expected == actual => {}
                None => return None,
            }
        }

        Some(params)
    }
}

/// `"/status/"` → `["status", ""]`, `"/"` → `[]`
fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Router que mapea método + patrón a handlers
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Router con las rutas de la API de itinerarios
    pub fn with_api_routes() -> Self {
        let mut router = Self::new();
        router.register(Method::GET, "/", index_handler);
        router.register(Method::POST, "/generate", generate_handler);
        router.register(Method::GET, "/status", status_handler);
        router.register(Method::GET, "/status/:jobId", status_handler);
        router
    }

    /// Registra una ruta con su handler
    pub fn register(&mut self, method: Method, pattern: &str, handler: Handler) {
        self.routes.push(Route {
            method,
            pattern: split_path(pattern).into_iter().map(str::to_string).collect(),
            handler,
        });
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// `OPTIONS` responde 200 vacío en cualquier path. Un panic dentro del
    /// handler se convierte en 500.
    pub fn route(&self, request: &Request, ctx: &AppContext) -> Response {
        let mut response = if request.method() == Method::OPTIONS {
            Response::empty(StatusCode::Ok)
        } else {
            self.dispatch(request, ctx)
        };

        add_common_headers(&mut response);
        response
    }

    fn dispatch(&self, request: &Request, ctx: &AppContext) -> Response {
        let found = self
            .routes
            .iter()
            .find_map(|route| route.matches(request.method(), request.path()).map(|p| (route.handler, p)));

        let Some((handler, params)) = found else {
            return Response::error(StatusCode::NotFound, "Endpoint not found");
        };

        match panic::catch_unwind(AssertUnwindSafe(|| handler(request, ctx, &params))) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => e.into_response(),
            Err(_) => {
                error!(method = request.method().as_str(), path = %request.path(), "handler panicked");
                Response::error(StatusCode::InternalServerError, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Agrega headers comunes a todas las respuestas
pub fn add_common_headers(response: &mut Response) {
    response.add_header("Access-Control-Allow-Origin", "*");
    response.add_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS");
    response.add_header("Access-Control-Allow-Headers", "Content-Type");
    response.add_header("Server", "Itinerary-HTTP/1.0");
    response.add_header("Connection", "close");
}
