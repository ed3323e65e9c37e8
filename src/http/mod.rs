//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Implementación mínima del protocolo HTTP/1.0 sin librerías de alto nivel:
//!
//! - Parsing de requests (request line, headers, body con `Content-Length`)
//! - Construcción de responses
//! - Códigos de estado
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 202 Accepted\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 64\r\n
//! \r\n
//! {"jobId":"1760745600000k3j9x2m1q","message":"Itinerary generation started"}
//! ```

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
