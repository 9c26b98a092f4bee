// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::constants::{DEFAULT_AUTHOR, DEFAULT_LANGUAGE, FALLBACK_LANG, PRIMARY_LANG};

// --- TEXTO LOCALIZADO ---

/// Un texto que puede ser una cadena plana o un mapa de código de idioma a
/// cadena. Usa `untagged` para aceptar ambas formas en TOML y JSON.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    ByLang(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Construye una variante plana a partir de cualquier `&str`/`String`.
    pub fn plain(text: impl Into<String>) -> Self {
        LocalizedText::Plain(text.into())
    }

    /// Resuelve el texto para un idioma. Cadena de respaldo: idioma pedido,
    /// idioma primario, idioma de respaldo, cualquier entrada, cadena vacía.
    pub fn resolve(&self, lang: &str) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::ByLang(map) => map
                .get(lang)
                .or_else(|| map.get(PRIMARY_LANG))
                .or_else(|| map.get(FALLBACK_LANG))
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    /// Representación primaria del texto; la usa la comparación laxa de
    /// selecciones entre valores de tipo mezclado.
    pub fn primary(&self) -> &str {
        self.resolve(PRIMARY_LANG)
    }

    /// Todas las variantes de idioma como cadenas independientes. Un texto
    /// plano tiene exactamente una variante.
    pub fn variants(&self) -> Vec<&str> {
        match self {
            LocalizedText::Plain(text) => vec![text.as_str()],
            LocalizedText::ByLang(map) => map.values().map(String::as_str).collect(),
        }
    }

    /// La variante concreta para un idioma (con la misma cadena de respaldo
    /// que `resolve`). A diferencia de `variants`, devuelve una sola cadena.
    pub fn variant_for(&self, lang: &str) -> &str {
        self.resolve(lang)
    }

    /// `true` si todas las variantes están vacías o en blanco.
    pub fn is_blank(&self) -> bool {
        self.variants().iter().all(|v| v.trim().is_empty())
    }

    /// Aplica un sufijo dependiente del idioma a cada variante (se usa al
    /// duplicar y al respaldar plantillas). Un texto plano recibe el sufijo
    /// del idioma activo `plain_lang`.
    pub fn with_suffix(
        &self,
        plain_lang: &str,
        suffix_for: impl Fn(&str) -> String,
    ) -> LocalizedText {
        match self {
            LocalizedText::Plain(text) => {
                LocalizedText::Plain(format!("{}{}", text, suffix_for(plain_lang)))
            }
            LocalizedText::ByLang(map) => LocalizedText::ByLang(
                map.iter()
                    .map(|(lang, text)| (lang.clone(), format!("{}{}", text, suffix_for(lang))))
                    .collect(),
            ),
        }
    }
}

// --- MODELOS DE LA BIBLIOTECA (lo que se lee/escribe en library.toml) ---

/// Una plantilla de prompt: contenido con marcadores `{{...}}` y el valor
/// actualmente elegido para cada aparición.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Template {
    pub id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub author: Option<String>,
    pub content: LocalizedText,
    /// Clave de aparición ("clave_completa-índice") -> valor elegido.
    #[serde(default)]
    pub selections: HashMap<String, LocalizedText>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Template {
    /// Crea una plantilla nueva de usuario con id fresco y sin selecciones.
    pub fn new(name: LocalizedText, content: LocalizedText) -> Self {
        Self {
            id: new_template_id(),
            name,
            author: Some(DEFAULT_AUTHOR.to_string()),
            content,
            selections: HashMap::new(),
            tags: Vec::new(),
        }
    }
}

/// Genera un id único para una plantilla creada por el usuario.
pub fn new_template_id() -> String {
    format!("tpl_{}", Uuid::new_v4().simple())
}

/// Un banco de palabras: valores candidatos para toda variable cuya clave
/// base coincida con la clave del banco.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Bank {
    pub label: LocalizedText,
    pub category: String,
    #[serde(default)]
    pub options: Vec<LocalizedText>,
}

/// Una categoría de bancos. El color es puramente de presentación; no
/// afecta a la vinculación ni a la sustitución.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub label: LocalizedText,
    pub color: String,
}

/// La unidad persistida: todas las plantillas y bancos del usuario.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Library {
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub banks: BTreeMap<String, Bank>,
    /// Valor por defecto por clave base, usado al renderizar cuando una
    /// aparición aún no tiene selección.
    #[serde(default)]
    pub defaults: BTreeMap<String, LocalizedText>,
    #[serde(default)]
    pub categories: BTreeMap<String, Category>,
}

impl Library {
    pub fn find_template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn find_template_mut(&mut self, id: &str) -> Option<&mut Template> {
        self.templates.iter_mut().find(|t| t.id == id)
    }
}

// --- PREFERENCIAS DEL USUARIO ---

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localized_text_deserializes_both_shapes_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            plain: LocalizedText,
            bilingual: LocalizedText,
        }

        let holder: Holder = toml::from_str(
            r#"
            plain = "una cadena"
            bilingual = { cn = "你好", en = "hello" }
            "#,
        )
        .unwrap();

        assert_eq!(holder.plain, LocalizedText::plain("una cadena"));
        assert_eq!(holder.bilingual.resolve("en"), "hello");
        assert_eq!(holder.bilingual.resolve("cn"), "你好");
    }

    #[test]
    fn resolve_falls_back_primary_then_secondary_then_any() {
        let mut map = BTreeMap::new();
        map.insert("fr".to_string(), "bonjour".to_string());
        let only_fr = LocalizedText::ByLang(map.clone());
        // Sin cn ni en: cualquier entrada determinista.
        assert_eq!(only_fr.resolve("en"), "bonjour");

        map.insert("en".to_string(), "hello".to_string());
        let with_en = LocalizedText::ByLang(map.clone());
        assert_eq!(with_en.resolve("de"), "hello");

        map.insert("cn".to_string(), "你好".to_string());
        let with_cn = LocalizedText::ByLang(map);
        assert_eq!(with_cn.resolve("de"), "你好");
        assert_eq!(with_cn.resolve("fr"), "bonjour");
    }

    #[test]
    fn blank_detection_covers_all_variants() {
        assert!(LocalizedText::plain("   ").is_blank());
        let mut map = BTreeMap::new();
        map.insert("cn".to_string(), " ".to_string());
        map.insert("en".to_string(), String::new());
        assert!(LocalizedText::ByLang(map.clone()).is_blank());
        map.insert("en".to_string(), "x".to_string());
        assert!(!LocalizedText::ByLang(map).is_blank());
    }

    #[test]
    fn with_suffix_applies_per_language() {
        let mut map = BTreeMap::new();
        map.insert("cn".to_string(), "海报".to_string());
        map.insert("en".to_string(), "Poster".to_string());
        let name = LocalizedText::ByLang(map);
        let suffixed = name.with_suffix("en", |lang| {
            if lang == "cn" {
                "（副本）".to_string()
            } else {
                " (Copy)".to_string()
            }
        });
        assert_eq!(suffixed.resolve("cn"), "海报（副本）");
        assert_eq!(suffixed.resolve("en"), "Poster (Copy)");
    }

    #[test]
    fn new_template_ids_are_unique() {
        let a = new_template_id();
        let b = new_template_id();
        assert_ne!(a, b);
        assert!(a.starts_with("tpl_"));
    }
}
