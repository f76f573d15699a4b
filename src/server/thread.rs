//! # Un Thread por Conexión
//! src/server/thread.rs
//!
//! Cada conexión aceptada se mueve a un thread nuevo. El stream pasa por
//! valor al closure del worker, así que cada thread es dueño de su propio
//! handle y el loop de `accept` no lo vuelve a tocar.
//!
//! El `JoinHandle` se descarta en el acto: el thread queda desacoplado y el
//! runtime libera sus recursos cuando termina. Nadie hace `join`.

use crate::error::DispatchError;
use crate::server::handler::ConnectionHandler;
use crate::server::strategy::{ConcurrencyStrategy, Dispatched};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Decrementa el contador de workers vivos al terminar el thread, incluso
/// si el handler entra en pánico
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Estrategia thread desacoplado por conexión
pub struct ThreadPerConnection {
    handler: Arc<ConnectionHandler>,
    live: Arc<AtomicUsize>,
    next_id: u64,
}

impl ThreadPerConnection {
    pub fn new(handler: ConnectionHandler) -> Self {
        Self {
            handler: Arc::new(handler),
            live: Arc::new(AtomicUsize::new(0)),
            next_id: 1,
        }
    }
}

impl ConcurrencyStrategy for ThreadPerConnection {
    fn name(&self) -> &'static str {
        "thread"
    }

    fn dispatch(&mut self, conn: TcpStream, peer: SocketAddr) -> Result<Dispatched, DispatchError> {
        let id = self.next_id;
        self.next_id += 1;
        let handler = Arc::clone(&self.handler);

        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(Arc::clone(&self.live));

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let _guard = guard;
                debug!(%peer, worker = id, "worker thread started");
                handler.serve_stream(conn, peer);
            });

        match spawned {
            // Soltar el handle desacopla el thread
            Ok(_detached) => {
                debug!(%peer, worker = id, "spawned worker thread");
                Ok(Dispatched::Parent)
            }
            Err(e) => {
                // El closure no se ejecutó y ya se soltó: eso cerró la
                // conexión y devolvió el contador
                warn!(%peer, worker = id, "connection closed without response");
                Err(DispatchError::Spawn(e))
            }
        }
    }

    /// Los threads se recuperan solos; no hay nada que recoger
    fn reclaim(&mut self) -> usize {
        0
    }

    fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn handler(&self) -> &ConnectionHandler {
        &self.handler
    }
}
