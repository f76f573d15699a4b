//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Loop de `accept` común a las dos estrategias. Es secuencial y de un solo
//! thread: acepta, entrega la conexión a un worker nuevo y vuelve a aceptar,
//! sin esperar nunca a que un worker termine.
//!
//! Solo `bind`/`listen` pueden detener el servidor. Un `accept`, `fork` o
//! `spawn` fallido se registra y el loop sigue.

use crate::config::Config;
use crate::error::ServerError;
use crate::server::listener;
use crate::server::strategy::{self, ConcurrencyStrategy, Dispatched};
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pausa tras el primer `accept` fallido
const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(10);

/// Pausa máxima entre `accept` fallidos consecutivos
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Espera creciente entre `accept` fallidos seguidos (p. ej. `EMFILE`)
///
/// Se duplica en cada fallo hasta `ACCEPT_BACKOFF_MAX` y vuelve a cero con
/// el primer `accept` exitoso.
#[derive(Debug, Default)]
struct AcceptBackoff {
    failures: u32,
}

impl AcceptBackoff {
    /// Registra un fallo y retorna cuánto dormir antes de reintentar
    fn on_failure(&mut self) -> Duration {
        let delay = ACCEPT_BACKOFF_MIN
            .saturating_mul(1u32 << self.failures.min(16))
            .min(ACCEPT_BACKOFF_MAX);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    fn reset(&mut self) {
        self.failures = 0;
    }

    fn failures(&self) -> u32 {
        self.failures
    }
}

/// Servidor con su listener ya abierto
pub struct Server {
    listener: TcpListener,
    strategy: Box<dyn ConcurrencyStrategy>,
    reap_interval: Duration,
}

impl Server {
    /// Valida la configuración y abre el socket de escucha
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        let strategy = strategy::from_config(config);
        Self::with_strategy(config, strategy)
    }

    /// Igual que [`Server::bind`] pero con una estrategia ya construida
    pub fn with_strategy(
        config: &Config,
        strategy: Box<dyn ConcurrencyStrategy>,
    ) -> Result<Self, ServerError> {
        let address = config.address();
        let listener = listener::bind(&address, config.backlog)?;

        Ok(Self {
            listener,
            strategy,
            reap_interval: config.reap_interval(),
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn strategy(&self) -> &dyn ConcurrencyStrategy {
        self.strategy.as_ref()
    }

    /// Corre el loop de `accept` para siempre
    ///
    /// En modo process, los hijos salen de aquí con `process::exit` después
    /// de atender su conexión.
    pub fn serve(self) -> ! {
        let Server {
            listener,
            mut strategy,
            reap_interval,
        } = self;

        match listener.local_addr() {
            Ok(addr) => info!(mode = strategy.name(), "Servidor escuchando en {}", addr),
            Err(_) => info!(mode = strategy.name(), "Servidor escuchando"),
        }

        let mut backoff = AcceptBackoff::default();

        loop {
            strategy.reclaim();

            // Con hijos pendientes, despertar cada `reap_interval` para
            // recogerlos aunque no lleguen conexiones
            if strategy.needs_reaping() {
                match listener::wait_readable(&listener, reap_interval) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => warn!(error = %e, "poll failed"),
                }
            }

            let (stream, peer) = match listener.accept() {
                Ok(accepted) => {
                    backoff.reset();
                    accepted
                }
                Err(e) => {
                    let delay = backoff.on_failure();
                    // Solo el primer fallo de una racha va a warn
                    if backoff.failures() == 1 {
                        warn!(error = %e, "accept failed");
                    } else {
                        debug!(error = %e, failures = backoff.failures(), "accept failed again");
                    }
                    std::thread::sleep(delay);
                    continue;
                }
            };

            debug!(%peer, "connection accepted");

            match strategy.dispatch(stream, peer) {
                Ok(Dispatched::Parent) => {}
                Ok(Dispatched::Child(stream)) => {
                    // El hijo nunca va a aceptar: suelta su copia del listener
                    drop(listener);
                    let code = strategy.handler().serve_stream(stream, peer);
                    std::process::exit(code);
                }
                Err(e) => warn!(%peer, error = %e, "dispatch failed"),
            }

            let reaped = strategy.reclaim();
            if reaped > 0 {
                debug!(reaped, live = strategy.live_workers(), "workers reclaimed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    fn ephemeral_config(mode: Mode) -> Config {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.mode = mode;
        config
    }

    #[test]
    fn test_accept_backoff_grows_and_caps() {
        let mut backoff = AcceptBackoff::default();

        assert_eq!(backoff.on_failure(), Duration::from_millis(10));
        assert_eq!(backoff.on_failure(), Duration::from_millis(20));
        assert_eq!(backoff.on_failure(), Duration::from_millis(40));
        assert_eq!(backoff.failures(), 3);

        for _ in 0..40 {
            assert!(backoff.on_failure() <= ACCEPT_BACKOFF_MAX);
        }
        assert_eq!(backoff.on_failure(), ACCEPT_BACKOFF_MAX);
    }

    #[test]
    fn test_accept_backoff_resets_after_success() {
        let mut backoff = AcceptBackoff::default();
        backoff.on_failure();
        backoff.on_failure();

        backoff.reset();
        assert_eq!(backoff.failures(), 0);
        assert_eq!(backoff.on_failure(), ACCEPT_BACKOFF_MIN);
    }

    #[test]
    fn test_bind_ephemeral() {
        let server = Server::bind(&ephemeral_config(Mode::Thread)).unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert_eq!(server.strategy().name(), "thread");
        assert_eq!(server.strategy().live_workers(), 0);
    }

    #[test]
    fn test_bind_rejects_invalid_config() {
        let mut config = ephemeral_config(Mode::Process);
        config.buffer_size = 1;
        assert!(matches!(Server::bind(&config), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_bind_port_in_use_is_fatal() {
        let first = Server::bind(&ephemeral_config(Mode::Thread)).unwrap();
        let mut config = ephemeral_config(Mode::Thread);
        config.port = first.local_addr().unwrap().port();

        assert!(matches!(Server::bind(&config), Err(ServerError::Bind { .. })));
    }
}
