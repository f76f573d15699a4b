//! # Un Proceso por Conexión
//! src/server/process.rs
//!
//! Cada conexión aceptada se atiende en un proceso hijo creado con `fork()`.
//! Los hijos no comparten memoria con el padre ni entre sí: el aislamiento
//! lo da el sistema operativo.
//!
//! - **Hijo**: recibe `Dispatched::Child(stream)`. El loop suelta su copia
//!   del listener, atiende la conexión y llama a `process::exit`.
//! - **Padre**: cierra su copia del stream en el acto, anota el pid y vuelve
//!   a `accept`.
//!
//! Los hijos terminados se recogen con `waitpid(pid, WNOHANG)` para que no
//! queden zombies. Nunca se bloquea esperando a un hijo concreto.

use crate::error::DispatchError;
use crate::server::handler::ConnectionHandler;
use crate::server::strategy::{ConcurrencyStrategy, Dispatched};
use std::collections::HashSet;
use std::io;
use std::net::{SocketAddr, TcpStream};
use tracing::{debug, info};

pub type Pid = libc::pid_t;

/// Estado de un hijo consultado sin bloquear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildState {
    Running,
    /// Terminó y se recogió. Lleva el status crudo de `waitpid`.
    Reaped(libc::c_int),
    /// Ya no es hijo nuestro (recogido por otro `waitpid`)
    Gone,
}

fn try_wait(pid: Pid) -> io::Result<ChildState> {
    let mut status: libc::c_int = 0;
    loop {
        // SAFETY: `status` es un puntero válido durante la llamada
        let ret = unsafe { libc::waitpid(pid, &mut status, libc::WNOHANG) };
        match ret {
            0 => return Ok(ChildState::Running),
            r if r == pid => return Ok(ChildState::Reaped(status)),
            _ => {
                let err = io::Error::last_os_error();
                match err.raw_os_error() {
                    Some(libc::EINTR) => continue,
                    Some(libc::ECHILD) => return Ok(ChildState::Gone),
                    _ => return Err(err),
                }
            }
        }
    }
}

/// Describe el status de `waitpid` para los logs
fn describe_status(status: libc::c_int) -> String {
    if libc::WIFEXITED(status) {
        format!("exit {}", libc::WEXITSTATUS(status))
    } else if libc::WIFSIGNALED(status) {
        format!("signal {}", libc::WTERMSIG(status))
    } else {
        format!("status {}", status)
    }
}

/// Estrategia `fork()` por conexión
#[derive(Debug)]
pub struct ProcessPerConnection {
    handler: ConnectionHandler,
    children: HashSet<Pid>,
}

impl ProcessPerConnection {
    pub fn new(handler: ConnectionHandler) -> Self {
        Self {
            handler,
            children: HashSet::new(),
        }
    }

    /// Pids de hijos aún no recogidos
    pub fn children(&self) -> impl Iterator<Item = Pid> + '_ {
        self.children.iter().copied()
    }
}

impl ConcurrencyStrategy for ProcessPerConnection {
    fn name(&self) -> &'static str {
        "process"
    }

    fn dispatch(&mut self, conn: TcpStream, peer: SocketAddr) -> Result<Dispatched, DispatchError> {
        // SAFETY: el hijo solo atiende su conexión y termina con
        // `process::exit`; nunca vuelve al loop de `accept`.
        let pid = unsafe { libc::fork() };

        match pid {
            -1 => {
                let err = io::Error::last_os_error();
                drop(conn);
                Err(DispatchError::Fork(err))
            }
            0 => Ok(Dispatched::Child(conn)),
            child => {
                // El padre no hace I/O sobre la conexión
                drop(conn);
                self.children.insert(child);
                info!(%peer, pid = child, "spawned worker process");
                Ok(Dispatched::Parent)
            }
        }
    }

    fn reclaim(&mut self) -> usize {
        let mut reaped = 0;

        self.children.retain(|&pid| match try_wait(pid) {
            Ok(ChildState::Running) => true,
            Ok(ChildState::Reaped(status)) => {
                debug!(pid, "worker process reaped ({})", describe_status(status));
                reaped += 1;
                false
            }
            Ok(ChildState::Gone) => {
                reaped += 1;
                false
            }
            Err(e) => {
                debug!(pid, error = %e, "waitpid failed");
                true
            }
        });

        reaped
    }

    fn live_workers(&self) -> usize {
        self.children.len()
    }

    fn needs_reaping(&self) -> bool {
        !self.children.is_empty()
    }

    fn handler(&self) -> &ConnectionHandler {
        &self.handler
    }
}
