// src/constants.rs

/// El nombre del subdirectorio de configuración de promptfill (en ~/.config/).
pub const APP_DIR: &str = "promptfill";

/// El nombre del archivo que contiene la biblioteca del usuario (plantillas y bancos).
pub const LIBRARY_FILENAME: &str = "library.toml";

/// El nombre del archivo de preferencias del usuario.
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// Ventana de coalescencia del historial de edición, en milisegundos.
/// Dentro de la ventana, las ediciones consecutivas comparten una sola
/// instantánea en vez de generar una por pulsación.
pub const HISTORY_SAVE_INTERVAL_MS: u64 = 1000;

/// Autor asignado a las plantillas creadas o duplicadas por el usuario.
pub const DEFAULT_AUTHOR: &str = "PromptFill User";

/// Sufijo añadido al nombre de la copia de respaldo cuando una plantilla
/// del sistema editada por el usuario se actualiza durante la fusión.
pub const BACKUP_SUFFIX: &str = " (backup)";

/// Idioma primario de los datos empaquetados; primer respaldo al resolver
/// un texto localizado.
pub const PRIMARY_LANG: &str = "cn";

/// Segundo respaldo al resolver un texto localizado.
pub const FALLBACK_LANG: &str = "en";

/// Idioma de interfaz por defecto si el usuario aún no eligió uno.
pub const DEFAULT_LANGUAGE: &str = "en";

/// URL base para los enlaces de compartición; el token va como parámetro.
pub const SHARE_BASE_URL: &str = "https://promptfill.app/?template=";
