//! # Manejo de una Conexión
//! src/server/handler.rs
//!
//! Un ciclo por conexión: una lectura, una respuesta, cierre. El handler
//! toma el stream por valor, así que la conexión se cierra exactamente una
//! vez (al soltarse) en cualquier rama, incluidas las de error.

use crate::config::Config;
use crate::error::HandlerError;
use crate::http::request::read_request;
use crate::http::response::{write_bad_request, write_not_found, write_ok};
use crate::http::{RequestKind, StatusCode};
use crate::resource::{Resource, StaticResource};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Qué respuesta recibió el cliente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 200 con `bytes` bytes de body
    Served { bytes: u64 },
    NotFound,
    BadRequest,
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Served { .. } => StatusCode::Ok,
            Outcome::NotFound => StatusCode::NotFound,
            Outcome::BadRequest => StatusCode::BadRequest,
        }
    }
}

/// Compone lectura → (recurso →) respuesta para una conexión
///
/// Es de solo lectura: el modo thread lo comparte entre workers con un `Arc`
/// y el modo process lo hereda copiado en cada hijo.
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    resource: StaticResource,
    buffer_size: usize,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl ConnectionHandler {
    pub fn new(resource: StaticResource, buffer_size: usize) -> Self {
        Self {
            resource,
            buffer_size,
            read_timeout: None,
            write_timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            resource: StaticResource::new(&config.resource),
            buffer_size: config.buffer_size,
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }

    pub fn with_timeouts(mut self, read: Option<Duration>, write: Option<Duration>) -> Self {
        self.read_timeout = read;
        self.write_timeout = write;
        self
    }

    pub fn resource(&self) -> &StaticResource {
        &self.resource
    }

    /// Atiende una conexión de principio a fin
    ///
    /// - `GET / ` + recurso disponible → 200 con el archivo
    /// - `GET / ` + recurso no disponible → 404
    /// - cualquier otra cosa → 400
    /// - fallo de lectura → `HandlerError::Read`, sin respuesta
    pub fn handle<S: Read + Write>(&self, mut conn: S) -> Result<Outcome, HandlerError> {
        let request = read_request(&mut conn, self.buffer_size).map_err(HandlerError::Read)?;

        if request.is_empty() {
            debug!("peer sent no data");
        } else {
            debug!(bytes = request.len(), "Received request:\n{}", request.as_text());
        }

        match request.kind() {
            RequestKind::Supported => match self.resource.load() {
                Resource::Found { size, mut file } => {
                    let bytes = write_ok(&mut conn, size, &mut file, self.buffer_size)
                        .map_err(HandlerError::Write)?;
                    Ok(Outcome::Served { bytes })
                }
                Resource::NotFound => {
                    write_not_found(&mut conn).map_err(HandlerError::Write)?;
                    Ok(Outcome::NotFound)
                }
            },
            RequestKind::Unsupported => {
                if !request.is_empty() {
                    debug!(line = %request.first_line(), "unsupported request");
                }
                write_bad_request(&mut conn).map_err(HandlerError::Write)?;
                Ok(Outcome::BadRequest)
            }
        }
    }

    /// Cuerpo completo de un worker: configura el socket, atiende y registra
    ///
    /// Retorna el código de salida del worker (0 = terminó normal).
    pub fn serve_stream(&self, stream: TcpStream, peer: SocketAddr) -> i32 {
        let start = Instant::now();

        if let Err(e) = self.configure(&stream) {
            // Sin timeouts el worker igual puede atender
            warn!(%peer, error = %e, "could not set socket timeouts");
        }

        match self.handle(stream) {
            Ok(outcome) => {
                info!(
                    %peer,
                    status = outcome.status().as_u16(),
                    elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "{}",
                    outcome.status()
                );
                0
            }
            Err(e) => {
                warn!(%peer, error = %e, "connection aborted");
                e.exit_code()
            }
        }
    }

    fn configure(&self, stream: &TcpStream) -> std::io::Result<()> {
        stream.set_read_timeout(self.read_timeout)?;
        stream.set_write_timeout(self.write_timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{BAD_REQUEST_RESPONSE, NOT_FOUND_RESPONSE};
    use std::io::{self, Cursor};
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::cell::{Cell, RefCell};

    /// Stream en memoria: lee de `input`, escribe en `output` y registra
    /// cuántas veces se cerró (drop)
    struct MemoryStream {
        input: Cursor<Vec<u8>>,
        output: Rc<RefCell<Vec<u8>>>,
        closed: Rc<Cell<u32>>,
        fail_read: bool,
    }

    impl MemoryStream {
        fn new(input: &[u8]) -> (Self, Rc<RefCell<Vec<u8>>>, Rc<Cell<u32>>) {
            let output = Rc::new(RefCell::new(Vec::new()));
            let closed = Rc::new(Cell::new(0));
            let stream = Self {
                input: Cursor::new(input.to_vec()),
                output: Rc::clone(&output),
                closed: Rc::clone(&closed),
                fail_read: false,
            };
            (stream, output, closed)
        }
    }

    impl Read for MemoryStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail_read {
                return Err(io::Error::from(io::ErrorKind::TimedOut));
            }
            self.input.read(buf)
        }
    }

    impl Write for MemoryStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for MemoryStream {
        fn drop(&mut self) {
            self.closed.set(self.closed.get() + 1);
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("webserver-handler-{}-{}", std::process::id(), name))
    }

    fn handler_for(path: &PathBuf) -> ConnectionHandler {
        ConnectionHandler::new(StaticResource::new(path), 1024)
    }

    #[test]
    fn test_handle_serves_resource() {
        let path = temp_path("ok.html");
        let content: Vec<u8> = (0..3000u32).map(|i| b'a' + (i % 26) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let (stream, output, closed) = MemoryStream::new(b"GET / HTTP/1.1\r\n\r\n");
        let outcome = handler_for(&path).handle(stream).unwrap();

        assert_eq!(outcome, Outcome::Served { bytes: 3000 });
        assert_eq!(closed.get(), 1);

        let out = output.borrow();
        let head = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 3000\r\nConnection: close\r\n\r\n";
        assert_eq!(&out[..head.len()], &head[..]);
        assert_eq!(&out[head.len()..], &content[..]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_handle_missing_resource() {
        let path = temp_path("missing.html");
        let (stream, output, closed) = MemoryStream::new(b"GET / HTTP/1.1\r\n\r\n");

        let outcome = handler_for(&path).handle(stream).unwrap();

        assert_eq!(outcome, Outcome::NotFound);
        assert_eq!(output.borrow().as_slice(), NOT_FOUND_RESPONSE.as_bytes());
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_handle_unsupported_requests() {
        let path = temp_path("unused.html");
        let inputs: [&[u8]; 5] = [
            b"GET /foo HTTP/1.1\r\n\r\n",
            b"POST / HTTP/1.1\r\n\r\n",
            b"get / HTTP/1.1\r\n\r\n",
            b"GET /",
            b"\r\n",
        ];

        for input in inputs {
            let (stream, output, closed) = MemoryStream::new(input);
            let outcome = handler_for(&path).handle(stream).unwrap();

            assert_eq!(outcome, Outcome::BadRequest);
            assert_eq!(output.borrow().as_slice(), BAD_REQUEST_RESPONSE.as_bytes());
            assert_eq!(closed.get(), 1);
        }
    }

    #[test]
    fn test_handle_empty_input_is_bad_request() {
        let (stream, output, closed) = MemoryStream::new(b"");
        let outcome = handler_for(&temp_path("unused.html")).handle(stream).unwrap();

        assert_eq!(outcome, Outcome::BadRequest);
        assert_eq!(output.borrow().as_slice(), BAD_REQUEST_RESPONSE.as_bytes());
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_handle_read_error_writes_nothing() {
        let (mut stream, output, closed) = MemoryStream::new(b"GET / HTTP/1.1\r\n\r\n");
        stream.fail_read = true;

        let err = handler_for(&temp_path("unused.html")).handle(stream).unwrap_err();

        assert!(matches!(err, HandlerError::Read(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(output.borrow().is_empty());
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_outcome_status() {
        assert_eq!(Outcome::Served { bytes: 0 }.status(), StatusCode::Ok);
        assert_eq!(Outcome::NotFound.status(), StatusCode::NotFound);
        assert_eq!(Outcome::BadRequest.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.resource = PathBuf::from("/srv/site/index.html");
        config.read_timeout_ms = 0;

        let handler = ConnectionHandler::from_config(&config);
        assert_eq!(handler.resource().path(), PathBuf::from("/srv/site/index.html").as_path());
        assert_eq!(handler.read_timeout, None);
        assert_eq!(handler.write_timeout, Some(Duration::from_secs(30)));
    }
}
