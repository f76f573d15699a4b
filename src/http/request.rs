//! # Lectura y Clasificación del Request
//! src/http/request.rs
//!
//! No hay parser HTTP: se hace **una sola** lectura bloqueante de hasta
//! `buffer_size - 1` bytes y se compara el inicio con el literal `GET / `
//! (con el espacio final). Cualquier otra cosa es un request no soportado,
//! incluso rutas legítimas como `GET /about`.
//!
//! ```text
//! GET / HTTP/1.1\r\n      -> Supported
//! GET /about HTTP/1.1\r\n -> Unsupported
//! POST / HTTP/1.1\r\n     -> Unsupported
//! (vacío)                 -> Unsupported
//! ```

use std::borrow::Cow;
use std::io::{self, Read};

/// Prefijo literal del único request soportado
pub const SUPPORTED_PREFIX: &[u8] = b"GET / ";

/// Resultado de clasificar los bytes recibidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Empieza exactamente con `GET / `
    Supported,

    /// Cualquier otra cosa
    Unsupported,
}

/// Clasifica un buffer por su prefijo
///
/// # Ejemplo
/// ```
/// use webserver::http::request::{classify, RequestKind};
///
/// assert_eq!(classify(b"GET / HTTP/1.1\r\n\r\n"), RequestKind::Supported);
/// assert_eq!(classify(b"GET /foo HTTP/1.1\r\n\r\n"), RequestKind::Unsupported);
/// ```
pub fn classify(bytes: &[u8]) -> RequestKind {
    if bytes.starts_with(SUPPORTED_PREFIX) {
        RequestKind::Supported
    } else {
        RequestKind::Unsupported
    }
}

/// Bytes recibidos en la única lectura de una conexión
#[derive(Debug, Clone)]
pub struct Request {
    raw: Vec<u8>,
    kind: RequestKind,
}

impl Request {
    /// Construye un request a partir de bytes ya leídos
    pub fn from_bytes(raw: Vec<u8>) -> Self {
        let kind = classify(&raw);
        Self { raw, kind }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn is_supported(&self) -> bool {
        self.kind == RequestKind::Supported
    }

    /// Bytes tal como llegaron
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// `true` si el peer cerró sin enviar nada
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Vista de texto para logs (bytes inválidos se reemplazan)
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    /// Primera línea del request, sin el `\r\n`
    pub fn first_line(&self) -> Cow<'_, str> {
        let end = self
            .raw
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .unwrap_or(self.raw.len());
        String::from_utf8_lossy(&self.raw[..end])
    }
}

/// Hace una única lectura de hasta `buffer_size - 1` bytes y la clasifica
///
/// Un `Err` es un ReadError: el llamador cierra la conexión sin responder.
/// Leer 0 bytes no es un error: produce un request vacío, que no cumple el
/// prefijo y por lo tanto es `Unsupported`.
pub fn read_request<R: Read>(conn: &mut R, buffer_size: usize) -> io::Result<Request> {
    let capacity = buffer_size.saturating_sub(1);
    let mut buffer = vec![0u8; capacity];

    let bytes_read = loop {
        match conn.read(&mut buffer) {
            Ok(n) => break n,
            // Una señal no cuenta como la lectura
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    };

    buffer.truncate(bytes_read);
    Ok(Request::from_bytes(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_classify_supported() {
        assert_eq!(classify(b"GET / HTTP/1.1\r\n\r\n"), RequestKind::Supported);
        assert_eq!(classify(b"GET / "), RequestKind::Supported);
        assert_eq!(classify(b"GET / anything goes after the prefix"), RequestKind::Supported);
    }

    #[test]
    fn test_classify_other_paths() {
        assert_eq!(classify(b"GET /about HTTP/1.1\r\n"), RequestKind::Unsupported);
        assert_eq!(classify(b"GET /foo HTTP/1.1\r\n\r\n"), RequestKind::Unsupported);
        assert_eq!(classify(b"GET /index.html HTTP/1.0\r\n"), RequestKind::Unsupported);
    }

    #[test]
    fn test_classify_other_methods() {
        assert_eq!(classify(b"POST / HTTP/1.1\r\n"), RequestKind::Unsupported);
        assert_eq!(classify(b"HEAD / HTTP/1.1\r\n"), RequestKind::Unsupported);
        assert_eq!(classify(b"get / HTTP/1.1\r\n"), RequestKind::Unsupported);
    }

    #[test]
    fn test_classify_malformed() {
        assert_eq!(classify(b""), RequestKind::Unsupported);
        assert_eq!(classify(b"GET /"), RequestKind::Unsupported);
        assert_eq!(classify(b"GET  / HTTP/1.1"), RequestKind::Unsupported);
        assert_eq!(classify(b"GET /\tHTTP/1.1"), RequestKind::Unsupported);
        assert_eq!(classify(b"\x00\x01\x02garbage"), RequestKind::Unsupported);
    }

    #[test]
    fn test_read_request_supported() {
        let mut conn = Cursor::new(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n".to_vec());
        let request = read_request(&mut conn, 1024).unwrap();

        assert!(request.is_supported());
        assert_eq!(request.first_line(), "GET / HTTP/1.1");
        assert!(request.as_text().contains("Host: x"));
    }

    #[test]
    fn test_read_request_caps_at_buffer_minus_one() {
        let mut payload = b"GET / ".to_vec();
        payload.extend(std::iter::repeat(b'a').take(4000));
        let mut conn = Cursor::new(payload);

        let request = read_request(&mut conn, 1024).unwrap();
        assert_eq!(request.len(), 1023);
        assert!(request.is_supported());
    }

    #[test]
    fn test_read_request_empty() {
        let mut conn = Cursor::new(Vec::new());
        let request = read_request(&mut conn, 1024).unwrap();

        assert!(request.is_empty());
        assert_eq!(request.kind(), RequestKind::Unsupported);
    }

    #[test]
    fn test_read_request_error() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::ConnectionReset))
            }
        }

        let err = read_request(&mut Failing, 1024).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn test_first_line_without_newline() {
        let request = Request::from_bytes(b"GET / HTTP/1.1".to_vec());
        assert_eq!(request.first_line(), "GET / HTTP/1.1");
    }
}
