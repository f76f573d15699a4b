//! # Códigos de Estado HTTP
//!
//! El servidor solo produce tres códigos:
//!
//! - **200**: el request es `GET / ` y el recurso existe
//! - **400**: cualquier otro request
//! - **404**: el request es `GET / ` pero el recurso no se pudo abrir

/// Códigos de estado que puede devolver el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - Se envía el recurso
    Ok = 200,

    /// 400 Bad Request - El request no empieza con `GET / `
    BadRequest = 400,

    /// 404 Not Found - El recurso no se pudo abrir
    NotFound = 404,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }

    /// Línea de estado completa, sin el `\r\n` final
    ///
    /// # Ejemplo
    /// ```
    /// use webserver::http::StatusCode;
    /// assert_eq!(StatusCode::NotFound.status_line(), "HTTP/1.1 404 Not Found");
    /// ```
    pub fn status_line(&self) -> String {
        format!("HTTP/1.1 {}", self)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
