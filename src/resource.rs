//! # Recurso Estático
//! src/resource.rs
//!
//! El servidor sirve un único archivo, fijado al arrancar. Cada request
//! soportado lo abre de nuevo, así que el contenido puede cambiar en disco
//! mientras el servidor corre.

use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resultado de abrir el recurso
#[derive(Debug)]
pub enum Resource {
    /// El archivo se abrió. `size` se consulta una sola vez al abrir.
    Found { size: u64, file: File },

    /// No se pudo abrir (no existe, sin permisos, etc.)
    NotFound,
}

/// Archivo que se sirve para `GET / `
#[derive(Debug, Clone)]
pub struct StaticResource {
    path: PathBuf,
}

impl StaticResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Abre el recurso y reporta su tamaño
    ///
    /// Cualquier fallo al abrir es `NotFound`, sin distinguir la causa.
    /// El descriptor se libera al soltar el `Resource`.
    pub fn load(&self) -> Resource {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "resource not available");
                return Resource::NotFound;
            }
        };

        match file.metadata() {
            Ok(meta) if meta.is_file() => Resource::Found { size: meta.len(), file },
            Ok(_) => {
                debug!(path = %self.path.display(), "resource is not a regular file");
                Resource::NotFound
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "fstat failed");
                Resource::NotFound
            }
        }
    }
}
