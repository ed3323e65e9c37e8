//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes, un thread por conexión
//! 3. Lee y parsea requests HTTP
//! 4. Genera y envía responses HTTP

pub mod tcp;

pub use tcp::Server;
