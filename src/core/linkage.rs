// src/core/linkage.rs

use crate::core::parser::parse_variable_name;
use crate::models::LocalizedText;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// Patrón de marcador `{{...}}`: sin llaves anidadas ni saltos de línea
/// dentro. Una secuencia `{{` sin cerrar no coincide y queda como texto
/// literal; nunca es un error.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}\n]+)\}\}").expect("patrón constante válido"));

/// Una aparición concreta de un marcador dentro de una cadena de contenido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// El nombre completo de la variable, ya recortado ("fruit_2").
    pub full_key: String,
    /// Ordinal de esta clave completa dentro de la pasada actual, desde 0.
    pub index: usize,
    /// Desplazamiento en bytes del marcador completo, `{{` incluido.
    pub start: usize,
    pub end: usize,
}

impl Occurrence {
    /// Clave única de la aparición: `"{clave_completa}-{índice}"`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.full_key, self.index)
    }
}

/// Recorre una cadena y devuelve cada marcador con su índice de aparición.
///
/// El índice cuenta por clave completa distinta y solo es estable dentro de
/// esta pasada: debe recalcularse cada vez que cambia el contenido. Los
/// marcadores en blanco ("{{  }}") se saltan y quedan como texto literal.
pub fn scan_occurrences(text: &str) -> Vec<Occurrence> {
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut occurrences = Vec::new();

    for caps in TOKEN_PATTERN.captures_iter(text) {
        let full_key = caps[1].trim().to_string();
        if full_key.is_empty() {
            continue;
        }
        let token = caps.get(0).expect("la captura 0 siempre existe");
        let counter = counters.entry(full_key.clone()).or_insert(0);
        let index = *counter;
        *counter += 1;
        occurrences.push(Occurrence {
            full_key,
            index,
            start: token.start(),
            end: token.end(),
        });
    }

    occurrences
}

/// Busca todas las apariciones de un contenido que deben mantenerse
/// sincronizadas con la pareja (clave base, grupo).
///
/// Las variables sin grupo nunca se vinculan: con `group_id` `None` el
/// resultado es el conjunto vacío. Cada variante de idioma se recorre por
/// separado con sus propios contadores; los índices no se comparten entre
/// variantes del mismo marcador lógico. El vínculo se calcula en fresco en
/// cada llamada, así que siempre refleja el contenido actual.
pub fn find_linked(
    content: &LocalizedText,
    base_key: &str,
    group_id: Option<&str>,
) -> BTreeSet<String> {
    let mut linked = BTreeSet::new();
    let Some(group_id) = group_id else {
        return linked;
    };

    for variant in content.variants() {
        for occurrence in scan_occurrences(variant) {
            // Un nombre que no se puede analizar se trata como texto ajeno.
            let Ok(parsed) = parse_variable_name(&occurrence.full_key) else {
                continue;
            };
            if parsed.base_key == base_key && parsed.group_id.as_deref() == Some(group_id) {
                linked.insert(occurrence.key());
            }
        }
    }

    linked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn keys(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn scan_counts_per_distinct_full_key() {
        let occurrences = scan_occurrences("{{fruit_1}} con {{color}} y {{fruit_1}}");
        let summary: Vec<(&str, usize)> = occurrences
            .iter()
            .map(|o| (o.full_key.as_str(), o.index))
            .collect();
        assert_eq!(
            summary,
            vec![("fruit_1", 0), ("color", 0), ("fruit_1", 1)]
        );
    }

    #[test]
    fn scan_trims_inner_whitespace_and_skips_blank_tokens() {
        let occurrences = scan_occurrences("{{ fruit }} y {{   }}");
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].full_key, "fruit");
    }

    #[test]
    fn unterminated_braces_are_literal_text() {
        let occurrences = scan_occurrences("{{fruit_1} roto pero {{fruit_1}} bien");
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].key(), "fruit_1-0");
    }

    #[test]
    fn tokens_with_newlines_inside_do_not_match() {
        let occurrences = scan_occurrences("{{fru\nit}} {{ok}}");
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].full_key, "ok");
    }

    #[test]
    fn grouped_query_finds_every_matching_occurrence() {
        let content =
            LocalizedText::plain("{{fruit_1}} and {{fruit_1}} but not {{fruit_2}}");

        let linked = find_linked(&content, "fruit", Some("1"));
        assert_eq!(keys(&linked), vec!["fruit_1-0", "fruit_1-1"]);

        let linked = find_linked(&content, "fruit", Some("2"));
        assert_eq!(keys(&linked), vec!["fruit_2-0"]);
    }

    #[test]
    fn ungrouped_query_returns_empty_set() {
        let content = LocalizedText::plain("{{fruit}} y {{fruit}}");
        assert!(find_linked(&content, "fruit", None).is_empty());
    }

    #[test]
    fn resolution_is_deterministic_for_fixed_content() {
        let content = LocalizedText::plain("{{a_1}} {{a_1}} {{b_1}} {{a_1}}");
        let first = find_linked(&content, "a", Some("1"));
        let second = find_linked(&content, "a", Some("1"));
        assert_eq!(first, second);
        assert_eq!(keys(&first), vec!["a_1-0", "a_1-1", "a_1-2"]);
    }

    #[test]
    fn language_variants_keep_independent_counters() {
        let mut map = BTreeMap::new();
        map.insert("cn".to_string(), "{{pose_1}}、{{pose_1}}、{{pose_1}}".to_string());
        map.insert("en".to_string(), "{{pose_1}} then {{pose_1}}".to_string());
        let content = LocalizedText::ByLang(map);

        // La variante cn aporta índices 0..2 y la en 0..1; el conjunto los
        // reúne sin compartir contadores entre variantes.
        let linked = find_linked(&content, "pose", Some("1"));
        assert_eq!(keys(&linked), vec!["pose_1-0", "pose_1-1", "pose_1-2"]);
    }

    #[test]
    fn group_id_comparison_is_textual() {
        // "fruit_02" y "fruit_2" son grupos distintos: el id se compara como
        // cadena, sin normalización numérica.
        let content = LocalizedText::plain("{{fruit_02}} {{fruit_2}}");
        let linked = find_linked(&content, "fruit", Some("2"));
        assert_eq!(keys(&linked), vec!["fruit_2-0"]);
    }
}
