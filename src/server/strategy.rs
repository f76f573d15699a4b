//! # Estrategias de Concurrencia
//! src/server/strategy.rs
//!
//! Una estrategia decide cómo se crea el worker de cada conexión aceptada y
//! cómo se recuperan los recursos de los workers que ya terminaron. El loop
//! de `accept` es el mismo para ambas (ver `tcp.rs`):
//!
//! ```text
//! Listening → Accepting → Dispatching → Listening → ...
//! ```

use crate::config::{Config, Mode};
use crate::error::DispatchError;
use crate::server::handler::ConnectionHandler;
use std::net::{SocketAddr, TcpStream};

/// Resultado de entregar una conexión a un worker
#[derive(Debug)]
pub enum Dispatched {
    /// Seguimos en el loop de `accept`; la conexión ya no es nuestra
    Parent,

    /// Estamos en el proceso hijo recién creado. Quien llama debe soltar el
    /// listener, atender `TcpStream` y terminar el proceso sin volver al loop.
    Child(TcpStream),
}

/// Política de creación y recuperación de workers
pub trait ConcurrencyStrategy: Send {
    /// Nombre para logs
    fn name(&self) -> &'static str;

    /// Entrega `conn` a un worker nuevo sin esperar a que termine
    ///
    /// Si falla, la conexión ya fue cerrada sin respuesta.
    fn dispatch(&mut self, conn: TcpStream, peer: SocketAddr) -> Result<Dispatched, DispatchError>;

    /// Recupera los workers terminados sin bloquear. Retorna cuántos.
    fn reclaim(&mut self) -> usize;

    /// Workers creados que todavía no se han recuperado
    fn live_workers(&self) -> usize;

    /// `true` si el loop debe despertar periódicamente para llamar a
    /// `reclaim` aunque no lleguen conexiones
    fn needs_reaping(&self) -> bool {
        false
    }

    /// Handler que ejecuta cada worker
    fn handler(&self) -> &ConnectionHandler;
}

/// Crea la estrategia configurada
pub fn from_config(config: &Config) -> Box<dyn ConcurrencyStrategy> {
    let handler = ConnectionHandler::from_config(config);
    match config.mode {
        Mode::Process => Box::new(super::process::ProcessPerConnection::new(handler)),
        Mode::Thread => Box::new(super::thread::ThreadPerConnection::new(handler)),
    }
}
