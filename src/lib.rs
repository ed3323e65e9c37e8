//! # Itinerary Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 que recibe pedidos de itinerarios de viaje, responde de
//! inmediato con un `jobId` y genera el itinerario en segundo plano llamando
//! a un modelo de lenguaje.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y manejo del protocolo HTTP/1.0
//! - `server`: Lógica del servidor TCP y manejo de conexiones
//! - `router`: Enrutamiento de peticiones a handlers
//! - `jobs`: Registro de jobs, persistencia y pipeline de generación
//! - `generation`: Prompt, cliente del modelo, reintentos y validación
//! - `config`: Argumentos CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use itinerary_server::config::Config;
//! use itinerary_server::server::Server;
//!
//! let config = Config::new();
//! config.validate()?;
//! let server = Server::from_config(&config)?;
//! server.run()?;
//! # Ok::<(), itinerary_server::error::Error>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod http;
pub mod jobs;
pub mod router;
pub mod server;
