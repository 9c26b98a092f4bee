// src/core/selection.rs

use crate::core::banks::{self, BankError};
use crate::core::linkage::find_linked;
use crate::core::parser::{ParseError, parse_variable_name};
use crate::models::{Library, LocalizedText, Template};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Nombre de variable inválido: {0}")]
    Parse(#[from] ParseError),
    #[error("No se encontró la plantilla '{id}'.")]
    UnknownTemplate { id: String },
}

type SelectionResult<T> = Result<T, SelectionError>;

/// Escribe el valor elegido en la aparición indicada y en todas las
/// vinculadas, como una única actualización sobre la plantilla.
///
/// El préstamo exclusivo de `template` garantiza que ningún estado
/// intermedio con solo parte de las claves actualizadas sea observable.
/// Una clave que ya no exista en el contenido se acepta igualmente: queda
/// como dato muerto inofensivo, nunca como error.
pub fn select(
    template: &mut Template,
    occurrence_key: &str,
    value: LocalizedText,
    linked_keys: &BTreeSet<String>,
) {
    for key in linked_keys {
        if key != occurrence_key {
            template.selections.insert(key.clone(), value.clone());
        }
    }
    template
        .selections
        .insert(occurrence_key.to_string(), value);
}

/// Gestiona una selección de usuario sobre la aparición `índice` de la
/// variable `full_key`: resuelve el grupo vinculado a partir del contenido
/// actual y aplica la escritura atómica. Devuelve las claves vinculadas.
pub fn handle_select(
    template: &mut Template,
    full_key: &str,
    index: usize,
    value: LocalizedText,
) -> Result<BTreeSet<String>, ParseError> {
    let occurrence_key = format!("{}-{}", full_key, index);
    let parsed = parse_variable_name(full_key)?;

    // El vínculo se calcula en fresco: nada de grafos cacheados.
    let linked = find_linked(
        &template.content,
        &parsed.base_key,
        parsed.group_id.as_deref(),
    );

    log::debug!(
        "Selección sobre '{}' con {} apariciones vinculadas.",
        occurrence_key,
        linked.len()
    );
    select(template, &occurrence_key, value, &linked);
    Ok(linked)
}

/// Añade un valor personalizado al banco de la clave base (si el banco
/// existe y aún no contiene el valor) y después lo selecciona.
///
/// Ambas escrituras ocurren bajo el mismo préstamo exclusivo de la
/// biblioteca, así que no es observable el estado intermedio en el que la
/// opción ya está en el banco pero todavía no seleccionada. Un valor en
/// blanco no hace nada.
pub fn add_custom_and_select(
    library: &mut Library,
    template_id: &str,
    full_key: &str,
    index: usize,
    value: LocalizedText,
) -> SelectionResult<BTreeSet<String>> {
    if value.is_blank() {
        return Ok(BTreeSet::new());
    }

    let parsed = parse_variable_name(full_key)?;

    // 1. Añadir al banco si existe; un banco desconocido no impide la
    //    selección.
    match banks::add_option(library, &parsed.base_key, value.clone()) {
        Ok(true) => log::info!("Valor nuevo añadido al banco '{}'.", parsed.base_key),
        Ok(false) => {}
        Err(BankError::UnknownBank { key }) => {
            log::debug!("No hay banco '{}'; solo se selecciona.", key);
        }
    }

    // 2. Seleccionarlo con la clave completa (que puede llevar grupo).
    let template =
        library
            .find_template_mut(template_id)
            .ok_or_else(|| SelectionError::UnknownTemplate {
                id: template_id.to_string(),
            })?;
    Ok(handle_select(template, full_key, index, value)?)
}

/// Igualdad de selección para marcar una opción como elegida.
///
/// Cadenas por igualdad exacta; registros localizados por igualdad
/// estructural sobre todos los idiomas presentes; tipos mezclados por su
/// representación primaria (comparación laxa; ver DESIGN.md).
pub fn is_selected(current: Option<&LocalizedText>, option: &LocalizedText) -> bool {
    let Some(current) = current else {
        return false;
    };
    match (current, option) {
        (LocalizedText::Plain(a), LocalizedText::Plain(b)) => a == b,
        (LocalizedText::ByLang(a), LocalizedText::ByLang(b)) => a == b,
        (a, b) => a.primary() == b.primary(),
    }
}
