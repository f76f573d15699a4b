//! # Escritura de Respuestas
//!
//! Hay exactamente tres formas de respuesta y todas cierran la conexión:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: <N>\r\n
//! Connection: close\r\n
//! \r\n
//! <N bytes del recurso>
//! ```
//!
//! Las respuestas 404 y 400 son bytes fijos. No llevan `Content-Length`:
//! el fin del body lo marca el cierre de la conexión.

use super::StatusCode;
use std::io::{self, Read, Write};

/// Respuesta 404 completa, tal como se envía
pub const NOT_FOUND_RESPONSE: &str = concat!(
    "HTTP/1.1 404 Not Found\r\n",
    "Content-Type: text/html\r\n",
    "Connection: close\r\n",
    "\r\n",
    "<html><body><h1>404 Not Found</h1></body></html>"
);

/// Respuesta 400 completa, tal como se envía
pub const BAD_REQUEST_RESPONSE: &str = concat!(
    "HTTP/1.1 400 Bad Request\r\n",
    "Content-Type: text/html\r\n",
    "Connection: close\r\n",
    "\r\n",
    "<html><body><h1>400 Bad Request</h1></body></html>"
);

/// Las tres respuestas posibles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// 200 con un body de `content_length` bytes que se envía aparte
    Ok { content_length: u64 },
    NotFound,
    BadRequest,
}

impl Response {
    /// Bytes que preceden al body del recurso
    ///
    /// Para 404 y 400 es la respuesta entera; para 200 son solo los headers.
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::http::Response;
    ///
    /// let head = Response::Ok { content_length: 5 }.header_bytes();
    /// let text = String::from_utf8(head).unwrap();
    /// assert!(text.contains("Content-Length: 5\r\n"));
    /// assert!(text.ends_with("\r\n\r\n"));
    /// ```
    pub fn header_bytes(&self) -> Vec<u8> {
        match self {
            Response::Ok { content_length } => format!(
                "{}\r\n\
                 Content-Type: text/html\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n",
                StatusCode::Ok.status_line(),
                content_length
            )
            .into_bytes(),
            Response::NotFound => NOT_FOUND_RESPONSE.as_bytes().to_vec(),
            Response::BadRequest => BAD_REQUEST_RESPONSE.as_bytes().to_vec(),
        }
    }
}

/// Envía la respuesta 404 fija
pub fn write_not_found<W: Write>(conn: &mut W) -> io::Result<()> {
    conn.write_all(NOT_FOUND_RESPONSE.as_bytes())?;
    conn.flush()
}

/// Envía la respuesta 400 fija
pub fn write_bad_request<W: Write>(conn: &mut W) -> io::Result<()> {
    conn.write_all(BAD_REQUEST_RESPONSE.as_bytes())?;
    conn.flush()
}

/// Envía el header 200 y luego el recurso en chunks de `chunk_size` bytes
///
/// `size` es el tamaño reportado al abrir el recurso; no se compara con los
/// bytes que realmente se leen. Si una escritura falla se deja de enviar y
/// se retorna el error, sin reintentos.
///
/// Retorna la cantidad de bytes del body enviados.
pub fn write_ok<W: Write, R: Read>(
    conn: &mut W,
    size: u64,
    body: &mut R,
    chunk_size: usize,
) -> io::Result<u64> {
    conn.write_all(&Response::Ok { content_length: size }.header_bytes())?;

    let mut chunk = vec![0u8; chunk_size.max(1)];
    let mut sent: u64 = 0;

    loop {
        let n = match body.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // Igual que un EOF: se corta el body
            Err(_) => break,
        };
        conn.write_all(&chunk[..n])?;
        sent += n as u64;
    }

    conn.flush()?;
    Ok(sent)
}
