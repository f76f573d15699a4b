//! # Webserver
//! src/lib.rs
//!
//! Servidor mínimo concurrente: acepta conexiones TCP, lee un request y
//! responde con un único archivo estático o con un error, cerrando la
//! conexión siempre. Lo interesante es el modelo de concurrencia, con dos
//! estrategias intercambiables:
//!
//! - **process**: un proceso hijo (`fork`) por conexión, recogido con
//!   `waitpid` para no dejar zombies
//! - **thread**: un thread desacoplado por conexión, que se libera solo
//!
//! ## Arquitectura
//!
//! - `http`: lectura/clasificación del request y las tres respuestas fijas
//! - `resource`: el archivo que se sirve
//! - `server`: listener, loop de `accept`, estrategias y handler
//! - `config`: argumentos CLI y variables de entorno
//! - `error`: tipos de error por nivel
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use webserver::config::Config;
//! use webserver::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! server.serve();
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod resource;
pub mod server;
