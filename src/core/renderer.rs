// src/core/renderer.rs

use crate::core::banks;
use crate::core::linkage::{Occurrence, scan_occurrences};
use crate::models::{Library, Template};

/// Sustituye cada aparición de un marcador por su valor elegido, por el
/// valor por defecto del banco o, en último término, deja el marcador
/// literal. Los valores localizados se resuelven para el idioma pedido.
pub fn render_text(text: &str, template: &Template, library: &Library, lang: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for occurrence in scan_occurrences(text) {
        result.push_str(&text[last_end..occurrence.start]);

        let value = template
            .selections
            .get(&occurrence.key())
            .or_else(|| banks::default_for(library, &occurrence.full_key));

        match value {
            Some(value) => result.push_str(value.resolve(lang)),
            // Sin selección ni valor por defecto: el marcador se queda.
            None => result.push_str(&text[occurrence.start..occurrence.end]),
        }

        last_end = occurrence.end;
    }

    result.push_str(&text[last_end..]);
    result
}

/// Renderiza la variante de contenido de la plantilla para un idioma.
pub fn render_template(template: &Template, library: &Library, lang: &str) -> String {
    let text = template.content.variant_for(lang);
    render_text(text, template, library, lang)
}

/// Las apariciones de la variante activa que aún no tienen selección ni
/// valor por defecto; el resumen que la interfaz muestra como "pendiente".
pub fn pending_occurrences(
    template: &Template,
    library: &Library,
    lang: &str,
) -> Vec<Occurrence> {
    scan_occurrences(template.content.variant_for(lang))
        .into_iter()
        .filter(|occurrence| {
            !template.selections.contains_key(&occurrence.key())
                && banks::default_for(library, &occurrence.full_key).is_none()
        })
        .collect()
}
