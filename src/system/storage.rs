// src/system/storage.rs

use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::config::{self, ConfigError};
use crate::core::catalog;
use crate::models::{Library, Settings};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Error de Ficheros: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(#[from] ConfigError),
    #[error("Error al parsear TOML en '{path}': {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Error al serializar a formato TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

type StorageResult<T> = Result<T, StorageError>;

// --- BIBLIOTECA ---

/// Carga la biblioteca del usuario desde su ruta habitual. Si todavía no
/// hay nada guardado, parte del catálogo del sistema.
pub fn load_library() -> StorageResult<Library> {
    load_library_from(&config::get_library_path()?)
}

/// Carga la biblioteca desde una ruta concreta (la usan también las
/// pruebas de integración).
pub fn load_library_from(path: &Path) -> StorageResult<Library> {
    if !path.exists() {
        log::info!("No hay biblioteca guardada; se parte del catálogo del sistema.");
        return Ok(catalog::initial_library());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| StorageError::TomlParse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Guarda la biblioteca en su ruta habitual.
pub fn save_library(library: &Library) -> StorageResult<()> {
    save_library_to(&config::get_library_path()?, library)
}

/// Guarda la biblioteca en una ruta concreta, de forma atómica: se escribe
/// en un archivo temporal del mismo directorio y se renombra encima del
/// definitivo, así un corte a mitad de escritura nunca deja un TOML a
/// medias.
pub fn save_library_to(path: &Path, library: &Library) -> StorageResult<()> {
    let toml_string = toml::to_string_pretty(library)?;
    write_atomic(path, toml_string.as_bytes())?;
    log::debug!("Biblioteca guardada en '{}'.", path.display());
    Ok(())
}

// --- PREFERENCIAS ---

/// Carga las preferencias del usuario; sin archivo, las de fábrica.
pub fn load_settings() -> StorageResult<Settings> {
    load_settings_from(&config::get_settings_path()?)
}

pub fn load_settings_from(path: &Path) -> StorageResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| StorageError::TomlParse {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn save_settings(settings: &Settings) -> StorageResult<()> {
    save_settings_to(&config::get_settings_path()?, settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> StorageResult<()> {
    let toml_string = toml::to_string_pretty(settings)?;
    write_atomic(path, toml_string.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new()?,
    };
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}
