// src/core/banks.rs

use crate::core::parser::parse_variable_name;
use crate::models::{Bank, Library, LocalizedText};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BankError {
    #[error("No existe ningún banco de palabras con la clave '{key}'.")]
    UnknownBank { key: String },
}

/// Añade un valor al banco si aún no está presente, comparando por igualdad
/// estructural. Devuelve `true` si el banco cambió.
pub fn add_option(
    library: &mut Library,
    base_key: &str,
    value: LocalizedText,
) -> Result<bool, BankError> {
    let bank = library
        .banks
        .get_mut(base_key)
        .ok_or_else(|| BankError::UnknownBank {
            key: base_key.to_string(),
        })?;

    if bank.options.contains(&value) {
        log::debug!("El valor ya existe en el banco '{}'; no se añade.", base_key);
        return Ok(false);
    }

    bank.options.push(value);
    Ok(true)
}

/// Busca el banco de una variable probando primero su clave base y después
/// la clave completa, el mismo respaldo que aplica el editor visual.
pub fn lookup_bank<'a>(library: &'a Library, full_key: &str) -> Option<&'a Bank> {
    let base_key = parse_variable_name(full_key).ok()?.base_key;
    library
        .banks
        .get(&base_key)
        .or_else(|| library.banks.get(full_key))
}

/// El valor por defecto para una variable, con el mismo respaldo de claves
/// que `lookup_bank`.
pub fn default_for<'a>(library: &'a Library, full_key: &str) -> Option<&'a LocalizedText> {
    let base_key = parse_variable_name(full_key).ok()?.base_key;
    library
        .defaults
        .get(&base_key)
        .or_else(|| library.defaults.get(full_key))
}
