//! # Módulo HTTP
//!
//! Lo mínimo del protocolo que necesita el servidor:
//!
//! - Una sola lectura del request y clasificación por prefijo literal
//! - Tres respuestas de forma fija (200, 404, 400), todas con
//!   `Connection: close`
//! - Códigos de estado
//!
//! No hay parsing de headers, keep-alive, pipelining ni chunked encoding.

pub mod request;   // Lectura y clasificación del request
pub mod response;  // Escritura de las respuestas
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Request, RequestKind};
pub use response::Response;
pub use status::StatusCode;
