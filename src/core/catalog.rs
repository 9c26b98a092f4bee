// src/core/catalog.rs

use include_dir::{Dir, include_dir};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::models::{Bank, Category, Library, LocalizedText, Template};

/// Los datos del sistema (plantillas y bancos) viajan embebidos en el
/// binario; no hay archivos que instalar junto al ejecutable.
static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/data");

const TEMPLATES_FILE: &str = "templates.toml";
const BANKS_FILE: &str = "banks.toml";

/// El catálogo del sistema: la fuente de verdad para la fusión de arranque
/// y para restaurar plantillas.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub templates: Vec<Template>,
    pub banks: BTreeMap<String, Bank>,
    pub defaults: BTreeMap<String, LocalizedText>,
    pub categories: BTreeMap<String, Category>,
}

#[derive(Deserialize)]
struct TemplatesFile {
    templates: Vec<Template>,
}

#[derive(Deserialize)]
struct BanksFile {
    banks: BTreeMap<String, Bank>,
    #[serde(default)]
    defaults: BTreeMap<String, LocalizedText>,
    #[serde(default)]
    categories: BTreeMap<String, Category>,
}

/// Caché explícita del catálogo: los TOML embebidos se analizan una sola
/// vez, en el primer acceso. Que analicen es un invariante de compilación,
/// de ahí los `expect`.
static SYSTEM_CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    let templates_toml = DATA_DIR
        .get_file(TEMPLATES_FILE)
        .and_then(|f| f.contents_utf8())
        .expect("data/templates.toml embebido y en UTF-8");
    let banks_toml = DATA_DIR
        .get_file(BANKS_FILE)
        .and_then(|f| f.contents_utf8())
        .expect("data/banks.toml embebido y en UTF-8");

    let templates: TemplatesFile =
        toml::from_str(templates_toml).expect("data/templates.toml válido");
    let banks: BanksFile = toml::from_str(banks_toml).expect("data/banks.toml válido");

    log::debug!(
        "Catálogo del sistema cargado: {} plantillas, {} bancos.",
        templates.templates.len(),
        banks.banks.len()
    );

    Catalog {
        templates: templates.templates,
        banks: banks.banks,
        defaults: banks.defaults,
        categories: banks.categories,
    }
});

pub fn system_catalog() -> &'static Catalog {
    &SYSTEM_CATALOG
}

/// La versión empaquetada de una plantilla del sistema, si existe.
pub fn system_template(id: &str) -> Option<&'static Template> {
    SYSTEM_CATALOG.templates.iter().find(|t| t.id == id)
}

pub fn is_system_template(id: &str) -> bool {
    system_template(id).is_some()
}

/// Una biblioteca nueva: copia profunda del catálogo del sistema. Es el
/// punto de partida cuando el usuario aún no tiene nada guardado.
pub fn initial_library() -> Library {
    let catalog = system_catalog();
    Library {
        templates: catalog.templates.clone(),
        banks: catalog.banks.clone(),
        defaults: catalog.defaults.clone(),
        categories: catalog.categories.clone(),
    }
}
