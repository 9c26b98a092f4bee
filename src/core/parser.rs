// src/core/parser.rs

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Patrón de nombre de variable: una base perezosa seguida, opcionalmente,
/// de un sufijo numérico delimitado por '_' al final de la cadena.
/// "fruit_2" -> base "fruit", grupo "2"; "size2" no se divide.
static VAR_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)(?:_([0-9]+))?$").expect("patrón constante válido"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Nombre de variable vacío o en blanco.")]
    InvalidToken,
}

/// Un nombre de variable descompuesto. La clave base identifica el banco de
/// palabras; el grupo, si existe, vincula apariciones entre sí.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableName {
    pub base_key: String,
    pub group_id: Option<String>,
}

/// Descompone el nombre de una variable en clave base y grupo opcional.
///
/// Solo un sufijo `_<dígitos>` al final forma grupo: "size2" devuelve la
/// clave completa con grupo `None`. Un nombre vacío o en blanco es un error;
/// nunca se acepta en silencio.
pub fn parse_variable_name(token: &str) -> Result<VariableName, ParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ParseError::InvalidToken);
    }

    let caps = VAR_NAME_PATTERN
        .captures(token)
        .ok_or(ParseError::InvalidToken)?;

    Ok(VariableName {
        base_key: caps[1].to_string(),
        group_id: caps.get(2).map(|m| m.as_str().to_string()),
    })
}
