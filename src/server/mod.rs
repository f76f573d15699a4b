//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP:
//! 1. Abre el socket de escucha (`listener`)
//! 2. Acepta conexiones en un loop secuencial (`tcp`)
//! 3. Entrega cada conexión a un worker nuevo según la estrategia
//!    (`process` o `thread`)
//! 4. El worker atiende la conexión con el `handler` y desaparece

pub mod handler;
pub mod listener;
pub mod process;
pub mod strategy;
pub mod tcp;
pub mod thread;

// Re-exportar para facilitar el uso
pub use handler::{ConnectionHandler, Outcome};
pub use process::ProcessPerConnection;
pub use strategy::{ConcurrencyStrategy, Dispatched};
pub use tcp::Server;
pub use thread::ThreadPerConnection;
