// src/core/merge.rs

use crate::constants::BACKUP_SUFFIX;
use crate::core::catalog::{self, Catalog};
use crate::models::{Bank, Library, LocalizedText, Template};
use std::collections::{BTreeMap, BTreeSet};

/// Resultado de una fusión: la biblioteca consolidada más las notas legibles
/// que describen cada ajuste, pensadas para registrarse en el log al
/// arrancar.
#[derive(Debug)]
pub struct MergeOutcome {
    pub library: Library,
    pub notes: Vec<String>,
}

/// Genera una clave que no colisiona con las existentes:
/// `base_sufijo`, `base_sufijo_2`, `base_sufijo_3`, ...
pub fn make_unique_key(base: &str, existing: &BTreeSet<String>, suffix: &str) -> String {
    let candidate = format!("{}_{}", base, suffix);
    if !existing.contains(&candidate) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}_{}", base, suffix, n);
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Fusiona la biblioteca guardada del usuario con el catálogo del sistema.
/// Las plantillas y bancos del sistema se actualizan a la fuerza; los
/// cambios del usuario se conservan como respaldo o se incorporan.
pub fn merge_library_with_system(stored: &Library) -> MergeOutcome {
    let catalog = catalog::system_catalog();
    let mut notes = Vec::new();

    let templates = merge_templates_with_system(&stored.templates, catalog, &mut notes);
    let (banks, defaults) = merge_banks_with_system(
        &stored.banks,
        &stored.defaults,
        catalog,
        &mut notes,
    );

    MergeOutcome {
        library: Library {
            templates,
            banks,
            defaults,
            // Las categorías no admiten personalización: manda el sistema.
            categories: catalog.categories.clone(),
        },
        notes,
    }
}

/// Fusiona las plantillas. El resultado parte de las del sistema en su
/// orden de catálogo; las selecciones del usuario migran a la copia
/// fusionada; una plantilla del sistema editada por el usuario se conserva
/// además como respaldo con id y nombre propios.
fn merge_templates_with_system(
    current: &[Template],
    catalog: &Catalog,
    notes: &mut Vec<String>,
) -> Vec<Template> {
    let mut merged: Vec<Template> = catalog.templates.clone();
    let mut existing_ids: BTreeSet<String> = merged.iter().map(|t| t.id.clone()).collect();

    for template in current {
        let Some(system) = catalog.templates.iter().find(|s| s.id == template.id) else {
            // Plantilla propia del usuario: entra tal cual, renombrando el
            // id si choca con algo ya presente.
            let mut custom = template.clone();
            if existing_ids.contains(&custom.id) {
                let new_id = make_unique_key(&custom.id, &existing_ids, "custom");
                notes.push(format!(
                    "La plantilla personalizada '{}' choca con el sistema; renombrada a '{}'.",
                    custom.id, new_id
                ));
                custom.id = new_id;
            }
            existing_ids.insert(custom.id.clone());
            merged.push(custom);
            continue;
        };

        // Migrar las selecciones del usuario a la copia fusionada.
        if let Some(target) = merged.iter_mut().find(|m| m.id == template.id) {
            target
                .selections
                .extend(template.selections.clone());
        }

        // Nombre o contenido cambiados: respaldar la versión del usuario.
        let is_different = template.name != system.name || template.content != system.content;
        if is_different {
            let backup_id = make_unique_key(&template.id, &existing_ids, "user");
            existing_ids.insert(backup_id.clone());

            let mut backup = template.clone();
            backup.id = backup_id.clone();
            backup.name = backup
                .name
                .with_suffix("en", |_| BACKUP_SUFFIX.to_string());

            notes.push(format!(
                "La plantilla '{}' se actualizó; la versión anterior queda como '{}'.",
                template.id, backup_id
            ));
            merged.push(backup);
        }
    }

    merged
}

/// Fusiona los bancos y sus valores por defecto. Los bancos del sistema
/// mandan; las opciones añadidas por el usuario se conservan; los bancos
/// personalizados se incorporan renombrando colisiones.
fn merge_banks_with_system(
    current_banks: &BTreeMap<String, Bank>,
    current_defaults: &BTreeMap<String, LocalizedText>,
    catalog: &Catalog,
    notes: &mut Vec<String>,
) -> (BTreeMap<String, Bank>, BTreeMap<String, LocalizedText>) {
    let mut merged = catalog.banks.clone();
    let mut merged_defaults = catalog.defaults.clone();
    let mut existing_keys: BTreeSet<String> = merged.keys().cloned().collect();

    for (key, bank) in current_banks {
        if let Some(system) = catalog.banks.get(key) {
            // Opciones del usuario ausentes del sistema (igualdad
            // estructural): se añaden al final, sin respaldo del banco.
            let custom: Vec<LocalizedText> = bank
                .options
                .iter()
                .filter(|opt| !system.options.contains(opt))
                .cloned()
                .collect();

            if !custom.is_empty() {
                notes.push(format!(
                    "El banco '{}' se sincronizó con el sistema conservando {} opción(es) propia(s).",
                    key,
                    custom.len()
                ));
                if let Some(target) = merged.get_mut(key) {
                    target.options.extend(custom);
                }
            }
        } else {
            let mut new_key = key.clone();
            if existing_keys.contains(&new_key) {
                new_key = make_unique_key(key, &existing_keys, "custom");
                notes.push(format!(
                    "El banco personalizado '{}' choca con el sistema; renombrado a '{}'.",
                    key, new_key
                ));
            }
            existing_keys.insert(new_key.clone());
            merged.insert(new_key.clone(), bank.clone());
            if let Some(default) = current_defaults.get(key) {
                merged_defaults.insert(new_key, default.clone());
            }
        }
    }

    // Valores por defecto del usuario para bancos que sobreviven.
    for (key, value) in current_defaults {
        if !merged_defaults.contains_key(key) && merged.contains_key(key) {
            merged_defaults.insert(key.clone(), value.clone());
        }
    }

    (merged, merged_defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_keys_never_collide() {
        let mut existing = BTreeSet::new();
        existing.insert("tpl_a_user".to_string());
        existing.insert("tpl_a_user_2".to_string());
        assert_eq!(make_unique_key("tpl_a", &existing, "user"), "tpl_a_user_3");
        assert_eq!(make_unique_key("tpl_b", &existing, "user"), "tpl_b_user");
    }

    #[test]
    fn untouched_system_templates_merge_without_notes() {
        let stored = catalog::initial_library();
        let outcome = merge_library_with_system(&stored);
        assert!(outcome.notes.is_empty());
        assert_eq!(
            outcome.library.templates.len(),
            catalog::system_catalog().templates.len()
        );
    }

    #[test]
    fn user_selections_migrate_onto_the_system_copy() {
        let mut stored = catalog::initial_library();
        let id = stored.templates[0].id.clone();
        stored.templates[0]
            .selections
            .insert("role-0".to_string(), LocalizedText::plain("elegido"));

        let outcome = merge_library_with_system(&stored);
        let merged = outcome.library.find_template(&id).unwrap();
        assert_eq!(
            merged.selections.get("role-0"),
            Some(&LocalizedText::plain("elegido"))
        );
        // Sin cambios de nombre/contenido no hay respaldo.
        assert!(outcome.notes.is_empty());
    }

    #[test]
    fn edited_system_template_is_backed_up_and_force_updated() {
        let mut stored = catalog::initial_library();
        let id = stored.templates[0].id.clone();
        stored.templates[0].content = LocalizedText::plain("versión del usuario");

        let outcome = merge_library_with_system(&stored);

        // La copia principal vuelve a ser la del sistema.
        let merged = outcome.library.find_template(&id).unwrap();
        assert_eq!(
            merged.content,
            catalog::system_template(&id).unwrap().content
        );

        // Y la versión del usuario sobrevive como respaldo con sufijo.
        let backup_id = format!("{}_user", id);
        let backup = outcome.library.find_template(&backup_id).unwrap();
        assert_eq!(backup.content, LocalizedText::plain("versión del usuario"));
        assert!(backup.name.resolve("en").ends_with(BACKUP_SUFFIX));
        assert_eq!(outcome.notes.len(), 1);
    }

    #[test]
    fn custom_template_with_colliding_id_is_renamed() {
        let mut stored = catalog::initial_library();
        let colliding_id = stored.templates[0].id.clone();
        // Una plantilla del usuario cuyo id coincide con el respaldo que la
        // propia fusión va a generar para una plantilla del sistema editada.
        stored.templates[0].content = LocalizedText::plain("editada");
        let mut rogue = stored.templates[0].clone();
        rogue.id = format!("{}_user", colliding_id);
        stored.templates.push(rogue);

        let outcome = merge_library_with_system(&stored);
        // El respaldo de la editada toma "<id>_user"; la plantilla del
        // usuario con ese mismo id se renombra a "<id>_user_custom".
        assert!(outcome
            .library
            .find_template(&format!("{}_user_custom", colliding_id))
            .is_some());
    }

    #[test]
    fn custom_bank_options_survive_a_system_sync() {
        let mut stored = catalog::initial_library();
        let key = stored.banks.keys().next().unwrap().clone();
        stored
            .banks
            .get_mut(&key)
            .unwrap()
            .options
            .push(LocalizedText::plain("opción propia"));

        let outcome = merge_library_with_system(&stored);
        let merged = outcome.library.banks.get(&key).unwrap();
        assert!(merged.options.contains(&LocalizedText::plain("opción propia")));
        assert_eq!(outcome.notes.len(), 1);
    }

    #[test]
    fn custom_banks_and_their_defaults_are_carried_over() {
        let mut stored = catalog::initial_library();
        stored.banks.insert(
            "mi_banco".to_string(),
            Bank {
                label: LocalizedText::plain("Mi banco"),
                category: "other".to_string(),
                options: vec![LocalizedText::plain("a")],
            },
        );
        stored
            .defaults
            .insert("mi_banco".to_string(), LocalizedText::plain("a"));

        let outcome = merge_library_with_system(&stored);
        assert!(outcome.library.banks.contains_key("mi_banco"));
        assert_eq!(
            outcome.library.defaults.get("mi_banco"),
            Some(&LocalizedText::plain("a"))
        );
    }
}
