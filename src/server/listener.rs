//! # Socket de Escucha
//! src/server/listener.rs
//!
//! `TcpListener::bind` de std no permite elegir el backlog, así que el
//! socket se arma con `socket2` y luego se convierte a un listener de std.

use crate::error::ServerError;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::os::fd::AsRawFd;
use std::time::Duration;

/// Crea, configura, hace `bind` y `listen` del socket del servidor
///
/// Cualquier fallo aquí es fatal para el servidor.
pub fn bind(address: &str, backlog: i32) -> Result<TcpListener, ServerError> {
    let addr = resolve(address)?;

    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP)).map_err(ServerError::Socket)?;

    // SO_REUSEADDR - permite reiniciar el servidor con conexiones en TIME_WAIT
    socket.set_reuse_address(true).map_err(ServerError::Socket)?;

    socket.bind(&addr.into()).map_err(|source| ServerError::Bind {
        addr: address.to_string(),
        source,
    })?;

    socket.listen(backlog).map_err(|source| ServerError::Listen {
        addr: address.to_string(),
        source,
    })?;

    Ok(socket.into())
}

fn resolve(address: &str) -> Result<SocketAddr, ServerError> {
    let mut addrs = address.to_socket_addrs().map_err(|source| ServerError::Bind {
        addr: address.to_string(),
        source,
    })?;

    addrs.next().ok_or_else(|| ServerError::Bind {
        addr: address.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "address resolved to nothing"),
    })
}

/// Espera hasta `timeout` a que haya una conexión pendiente en el listener
///
/// Retorna `true` si `accept` no va a bloquear. Lo usa el loop para poder
/// recoger workers terminados aunque no lleguen conexiones nuevas.
pub fn wait_readable(listener: &TcpListener, timeout: Duration) -> std::io::Result<bool> {
    let mut fds = libc::pollfd {
        fd: listener.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    // SAFETY: `fds` apunta a un único pollfd válido durante la llamada
    let ret = unsafe { libc::poll(&mut fds, 1, millis) };
    match ret {
        -1 => {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                Ok(false)
            } else {
                Err(err)
            }
        }
        0 => Ok(false),
        _ => Ok(true),
    }
}
