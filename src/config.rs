//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno. Todos los valores son de solo lectura una vez que el servidor
//! arranca: se pasan explícitamente a `Server::bind`, nunca como constantes
//! globales, para poder probar con puertos efímeros.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./webserver --port 8080 --mode process --resource ./index.html
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 SERVER_MODE=thread ./webserver
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Estrategia de concurrencia: cómo se crea el worker de cada conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Un proceso hijo (fork) por conexión
    Process,

    /// Un thread desacoplado (detached) por conexión
    Thread,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Process => "process",
            Mode::Thread => "thread",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "webserver")]
#[command(about = "Servidor HTTP mínimo: un proceso o un thread por conexión")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Conexiones pendientes máximas en la cola de `listen`
    #[arg(long, default_value = "5", env = "HTTP_BACKLOG")]
    pub backlog: i32,

    /// Estrategia de concurrencia
    #[arg(short, long, value_enum, default_value = "thread", env = "SERVER_MODE")]
    pub mode: Mode,

    /// Archivo que se sirve para `GET /` (relativo al directorio de trabajo)
    #[arg(long, default_value = "index.html", env = "RESOURCE_PATH")]
    pub resource: PathBuf,

    /// Tamaño del buffer de lectura del request y de los chunks del body
    #[arg(long = "buffer-size", default_value = "1024", env = "BUFFER_SIZE")]
    pub buffer_size: usize,

    // === Timeouts ===

    /// Timeout de lectura del socket en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "30000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura del socket en milisegundos (0 = sin timeout)
    #[arg(long = "write-timeout-ms", default_value = "30000", env = "WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    /// Cada cuánto se recogen procesos hijos terminados mientras no llegan conexiones
    #[arg(long = "reap-interval-ms", default_value = "250", env = "REAP_INTERVAL_MS")]
    pub reap_interval_ms: u64,

    /// Nivel de log (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use webserver::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_millis(self.reap_interval_ms)
    }

    /// Nivel de log ya parseado
    pub fn log_level(&self) -> Result<tracing::Level, String> {
        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| format!("Invalid log level: {}", self.log_level))
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.backlog < 1 {
            return Err("Backlog must be >= 1".to_string());
        }

        // El prefijo soportado ocupa 6 bytes y se lee como máximo buffer_size - 1
        if self.buffer_size < 7 {
            return Err("Buffer size must be >= 7".to_string());
        }

        if self.resource.as_os_str().is_empty() {
            return Err("Resource path must not be empty".to_string());
        }

        if self.reap_interval_ms == 0 {
            return Err("Reap interval must be > 0".to_string());
        }

        self.log_level()?;

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Backlog:      {}", self.backlog);
        println!();
        println!("👷 Workers:");
        println!("   Mode:         {} per connection", self.mode);
        println!("   Resource:     {}", self.resource.display());
        println!("   Buffer:       {} bytes", self.buffer_size);
        println!();
        println!("⏱️  Timeouts:");
        println!("   Read:         {}", describe_timeout(self.read_timeout_ms));
        println!("   Write:        {}", describe_timeout(self.write_timeout_ms));
        println!("   Reap every:   {} ms", self.reap_interval_ms);
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            backlog: 5,
            mode: Mode::Thread,
            resource: PathBuf::from("index.html"),
            buffer_size: 1024,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
            reap_interval_ms: 250,
            log_level: "info".to_string(),
        }
    }
}

fn millis(ms: u64) -> Option<Duration> {
    if ms == 0 {
        None
    } else {
        Some(Duration::from_millis(ms))
    }
}

fn describe_timeout(ms: u64) -> String {
    if ms == 0 {
        "disabled".to_string()
    } else {
        format!("{} ms", ms)
    }
}
