//! # Tipos de Error
//! src/error.rs
//!
//! Tres niveles, de más a menos grave:
//! - [`ServerError`]: fallos de arranque. Terminan el proceso.
//! - [`DispatchError`]: no se pudo crear el worker de una conexión. Se
//!   registran y el loop de `accept` continúa.
//! - [`HandlerError`]: fallos de I/O dentro de una conexión. Solo afectan
//!   al worker que la atiende.

use std::io;
use thiserror::Error;

/// Errores fatales del servidor
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuración inválida
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No se pudo crear el socket de escucha
    #[error("socket failed: {0}")]
    Socket(#[source] io::Error),

    /// Falló `bind`
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Falló `listen`
    #[error("listen failed on {addr}: {source}")]
    Listen {
        addr: String,
        #[source]
        source: io::Error,
    },
}

impl ServerError {
    /// Código de salida del proceso para este error
    pub fn exit_code(&self) -> i32 {
        match self {
            ServerError::Config(_) => 2,
            _ => 1,
        }
    }
}

/// No se pudo entregar una conexión aceptada a un worker nuevo
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("fork failed: {0}")]
    Fork(#[source] io::Error),

    #[error("thread spawn failed: {0}")]
    Spawn(#[source] io::Error),
}

/// Errores de I/O durante el manejo de una conexión
#[derive(Debug, Error)]
pub enum HandlerError {
    /// La única lectura del request falló (incluye timeout de lectura)
    #[error("recv failed: {0}")]
    Read(#[source] io::Error),

    /// Falló el envío de la respuesta; el stream se corta sin reintentos
    #[error("send failed: {0}")]
    Write(#[source] io::Error),
}

impl HandlerError {
    /// Código de salida del worker
    ///
    /// Un error de lectura aborta el worker. Un error de escritura no: la
    /// respuesta simplemente queda truncada.
    pub fn exit_code(&self) -> i32 {
        match self {
            HandlerError::Read(_) => 1,
            HandlerError::Write(_) => 0,
        }
    }
}
