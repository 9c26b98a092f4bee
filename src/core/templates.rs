// src/core/templates.rs

use crate::constants::DEFAULT_AUTHOR;
use crate::core::catalog;
use crate::models::{Library, LocalizedText, Template, new_template_id};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TemplateError {
    #[error("No se encontró la plantilla '{id}'.")]
    NotFound { id: String },
    #[error("No se puede eliminar la última plantilla de la biblioteca.")]
    LastTemplate,
    #[error("La plantilla '{id}' no es del sistema; no hay versión original que restaurar.")]
    NotASystemTemplate { id: String },
}

type TemplateResult<T> = Result<T, TemplateError>;

/// Sufijo de nombre al duplicar una plantilla, por idioma.
pub fn copy_suffix(lang: &str) -> &'static str {
    match lang {
        "cn" => "（副本）",
        _ => " (Copy)",
    }
}

/// Crea una plantilla nueva y la añade al final de la biblioteca.
/// Devuelve el id asignado.
pub fn add_template(
    library: &mut Library,
    name: LocalizedText,
    content: LocalizedText,
) -> String {
    let template = Template::new(name, content);
    let id = template.id.clone();
    log::info!("Plantilla '{}' creada.", id);
    library.templates.push(template);
    id
}

/// Duplica una plantilla: id fresco, nombre con sufijo de copia por idioma
/// y selecciones clonadas. La copia de una plantilla del sistema pasa a
/// estar atribuida al autor por defecto.
pub fn duplicate_template(
    library: &mut Library,
    id: &str,
    lang: &str,
) -> TemplateResult<String> {
    let original = library
        .find_template(id)
        .ok_or_else(|| TemplateError::NotFound { id: id.to_string() })?;

    let mut copy = original.clone();
    copy.id = new_template_id();
    copy.name = copy
        .name
        .with_suffix(lang, |l| copy_suffix(l).to_string());
    if catalog::is_system_template(id) || copy.author.is_none() {
        copy.author = Some(DEFAULT_AUTHOR.to_string());
    }

    let new_id = copy.id.clone();
    log::info!("Plantilla '{}' duplicada como '{}'.", id, new_id);
    library.templates.push(copy);
    Ok(new_id)
}

/// Elimina una plantilla. La biblioteca nunca puede quedarse vacía: borrar
/// la última es un error, no un estado alcanzable.
pub fn delete_template(library: &mut Library, id: &str) -> TemplateResult<()> {
    if library.templates.len() <= 1 {
        return Err(TemplateError::LastTemplate);
    }
    let position = library
        .templates
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TemplateError::NotFound { id: id.to_string() })?;

    library.templates.remove(position);
    log::info!("Plantilla '{}' eliminada.", id);
    Ok(())
}

/// Restaura una plantilla del sistema a su versión empaquetada, selecciones
/// incluidas.
pub fn reset_template(library: &mut Library, id: &str) -> TemplateResult<()> {
    let position = library
        .templates
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TemplateError::NotFound { id: id.to_string() })?;

    let original = catalog::system_template(id)
        .ok_or_else(|| TemplateError::NotASystemTemplate { id: id.to_string() })?;

    library.templates[position] = original.clone();
    log::info!("Plantilla '{}' restaurada a su versión del sistema.", id);
    Ok(())
}

/// Renombra una plantilla en el idioma activo. Con nombre localizado solo
/// se escribe la entrada de ese idioma; un nombre en blanco no hace nada.
pub fn rename_template(
    library: &mut Library,
    id: &str,
    new_name: &str,
    lang: &str,
) -> TemplateResult<()> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        log::debug!("Renombrado de '{}' ignorado: nombre en blanco.", id);
        return Ok(());
    }

    let template = library
        .find_template_mut(id)
        .ok_or_else(|| TemplateError::NotFound { id: id.to_string() })?;

    match &mut template.name {
        LocalizedText::Plain(text) => *text = new_name.to_string(),
        LocalizedText::ByLang(map) => {
            map.insert(lang.to_string(), new_name.to_string());
        }
    }
    Ok(())
}

/// Reemplaza las etiquetas de una plantilla.
pub fn set_tags(library: &mut Library, id: &str, tags: Vec<String>) -> TemplateResult<()> {
    let template = library
        .find_template_mut(id)
        .ok_or_else(|| TemplateError::NotFound { id: id.to_string() })?;
    template.tags = tags;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn library_with_two() -> Library {
        let mut library = catalog::initial_library();
        library.templates.truncate(2);
        library
    }

    #[test]
    fn add_appends_a_user_template_with_fresh_id() {
        let mut library = library_with_two();
        let before = library.templates.len();
        let id = add_template(
            &mut library,
            LocalizedText::plain("Mía"),
            LocalizedText::plain("{{role}}"),
        );

        assert_eq!(library.templates.len(), before + 1);
        let template = library.find_template(&id).unwrap();
        assert_eq!(template.author.as_deref(), Some(DEFAULT_AUTHOR));
        assert!(template.selections.is_empty());
    }

    #[test]
    fn duplicate_suffixes_name_per_language_and_reassigns_author() {
        let mut library = library_with_two();
        let source_id = library.templates[0].id.clone();
        let new_id = duplicate_template(&mut library, &source_id, "en").unwrap();

        assert_ne!(new_id, source_id);
        let copy = library.find_template(&new_id).unwrap();
        assert!(copy.name.resolve("en").ends_with(" (Copy)"));
        assert!(copy.name.resolve("cn").ends_with("（副本）"));
        assert_eq!(copy.author.as_deref(), Some(DEFAULT_AUTHOR));
    }

    #[test]
    fn delete_refuses_to_empty_the_library() {
        let mut library = library_with_two();
        let first = library.templates[0].id.clone();
        let second = library.templates[1].id.clone();

        delete_template(&mut library, &first).unwrap();
        assert_eq!(
            delete_template(&mut library, &second),
            Err(TemplateError::LastTemplate)
        );
    }

    #[test]
    fn delete_unknown_id_is_reported() {
        let mut library = library_with_two();
        assert_eq!(
            delete_template(&mut library, "tpl_inexistente"),
            Err(TemplateError::NotFound {
                id: "tpl_inexistente".to_string()
            })
        );
    }

    #[test]
    fn reset_restores_the_bundled_version_in_place() {
        let mut library = library_with_two();
        let id = library.templates[0].id.clone();
        {
            let template = library.find_template_mut(&id).unwrap();
            template.content = LocalizedText::plain("contenido cambiado");
            template
                .selections
                .insert("role-0".to_string(), LocalizedText::plain("x"));
        }

        reset_template(&mut library, &id).unwrap();

        let template = library.find_template(&id).unwrap();
        assert_eq!(template, catalog::system_template(&id).unwrap());
        // Sigue en la misma posición.
        assert_eq!(library.templates[0].id, id);
    }

    #[test]
    fn reset_rejects_user_templates() {
        let mut library = library_with_two();
        let id = add_template(
            &mut library,
            LocalizedText::plain("Mía"),
            LocalizedText::plain("x"),
        );
        assert_eq!(
            reset_template(&mut library, &id),
            Err(TemplateError::NotASystemTemplate { id })
        );
    }

    #[test]
    fn rename_touches_only_the_active_language() {
        let mut library = library_with_two();
        let mut map = BTreeMap::new();
        map.insert("cn".to_string(), "旧".to_string());
        map.insert("en".to_string(), "Old".to_string());
        let id = add_template(
            &mut library,
            LocalizedText::ByLang(map),
            LocalizedText::plain("x"),
        );

        rename_template(&mut library, &id, "New", "en").unwrap();
        let template = library.find_template(&id).unwrap();
        assert_eq!(template.name.resolve("en"), "New");
        assert_eq!(template.name.resolve("cn"), "旧");

        // En blanco: sin efecto.
        rename_template(&mut library, &id, "   ", "en").unwrap();
        assert_eq!(
            library.find_template(&id).unwrap().name.resolve("en"),
            "New"
        );
    }
}
