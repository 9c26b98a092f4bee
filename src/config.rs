// src/config.rs

use crate::constants::{APP_DIR, LIBRARY_FILENAME, SETTINGS_FILENAME};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No se pudo encontrar el directorio de configuración del sistema.")]
    ConfigDirNotFound,
    #[error("No se pudo crear el directorio de configuración en '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Devuelve la ruta al directorio de configuración de PromptFill.
/// Lo crea si no existe.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    let config_path = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join(APP_DIR);
    log::debug!("Directorio de config: {:?}", config_path);
    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| ConfigError::CreateDir {
            path: config_path.display().to_string(),
            source: e,
        })?;
    }

    Ok(config_path)
}

/// Devuelve la ruta al archivo library.toml.
pub fn get_library_path() -> Result<PathBuf, ConfigError> {
    get_config_dir().map(|dir| dir.join(LIBRARY_FILENAME))
}

/// Devuelve la ruta al archivo settings.toml.
pub fn get_settings_path() -> Result<PathBuf, ConfigError> {
    get_config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}
