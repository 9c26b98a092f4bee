// src/core/share.rs

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;

use crate::constants::SHARE_BASE_URL;
use crate::models::{Library, Template, new_template_id};

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("El token no es base64 válido: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("El token no contiene una plantilla válida: {0}")]
    Json(#[from] serde_json::Error),
}

type ShareResult<T> = Result<T, ShareError>;

/// Codifica una plantilla como token portátil: JSON compacto en base64
/// apto para URL (sin relleno).
pub fn encode_share_token(template: &Template) -> ShareResult<String> {
    let json = serde_json::to_vec(template)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decodifica un token de compartición en una plantilla.
pub fn decode_share_token(token: &str) -> ShareResult<Template> {
    let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// El enlace de compartición completo para una plantilla.
pub fn share_url(template: &Template) -> ShareResult<String> {
    Ok(format!("{}{}", SHARE_BASE_URL, encode_share_token(template)?))
}

/// Importa una plantilla desde un token. Si el id ya existe en la
/// biblioteca, la importada recibe uno nuevo en vez de pisar la local.
pub fn import_template(library: &mut Library, token: &str) -> ShareResult<String> {
    let mut template = decode_share_token(token)?;
    if library.find_template(&template.id).is_some() {
        let new_id = new_template_id();
        log::info!(
            "El id importado '{}' ya existe; se asigna '{}'.",
            template.id,
            new_id
        );
        template.id = new_id;
    }
    let id = template.id.clone();
    library.templates.push(template);
    Ok(id)
}
