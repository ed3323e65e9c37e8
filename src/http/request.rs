//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser HTTP/1.x mínimo para la API de itinerarios.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /generate HTTP/1.1\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 44\r\n
//! \r\n
//! {"destination": "Lisbon", "durationDays": 3}
//! ```
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/1.x`
//! 2. **Headers**: pares `Name: Value`
//! 3. **Línea vacía** que separa headers del body
//! 4. **Body**: bytes restantes, acotados por `Content-Length`

use thiserror::Error;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP reconocidos por el parser
///
/// El router sólo atiende algunos; el resto termina en 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    PATCH,
    DELETE,
    OPTIONS,
}

impl Method {
    fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty request")]
    EmptyRequest,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path sin query string (ej: "/status/abc")
    path: String,

    /// Headers en el orden recibido
    headers: Vec<(String, String)>,

    version: String,

    body: Vec<u8>,
}

impl Request {
    /// Parsea un request completo desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use itinerary_server::http::Request;
    ///
    /// let raw = b"GET /status/abc?x=1 HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/status/abc");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let (head, body) = match find_subslice(buffer, HEAD_TERMINATOR) {
            Some(pos) => (&buffer[..pos], &buffer[pos + HEAD_TERMINATOR.len()..]),
            None => (buffer, &[][..]),
        };

        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;

        if head.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = head.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;
        let (method, path, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        let mut request = Request {
            method,
            path,
            headers,
            version,
            body: body.to_vec(),
        };

        if let Some(length) = request.content_length() {
            request.body.truncate(length);
        }

        Ok(request)
    }

    /// Tamaño total esperado del request (headers + body) si los headers
    /// ya están completos en `buffer`.
    ///
    /// El servidor lo usa para saber cuándo dejar de leer del socket. Un
    /// `Content-Length` gigante satura en `usize::MAX`.
    pub fn expected_len(buffer: &[u8]) -> Option<usize> {
        let head_end = find_subslice(buffer, HEAD_TERMINATOR)? + HEAD_TERMINATOR.len();
        let head = String::from_utf8_lossy(&buffer[..head_end]);

        let content_length = head
            .split("\r\n")
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        Some(head_end.saturating_add(content_length))
    }

    /// Formato: `GET /path?query HTTP/1.0`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::parse(parts[0])?;

        // La query string no se usa en esta API
        let path = match parts[1].split_once('?') {
            Some((path, _query)) => path.to_string(),
            None => parts[1].to_string(),
        };

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, version))
    }

    fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Vec<(String, String)>, ParseError> {
        let mut headers = Vec::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => headers.push((name.trim().to_string(), value.trim().to_string())),
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    fn content_length(&self) -> Option<usize> {
        self.header("Content-Length").and_then(|v| v.parse().ok())
    }

    /// Método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path del request (sin query string)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene un header (el nombre no distingue mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Versión HTTP declarada por el cliente
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
