// src/bin/promptfill.rs

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use promptfill::cli::Cli;
use promptfill::core::history::HistoryMap;
use promptfill::core::{banks, linkage, merge, renderer, selection, share, templates};
use promptfill::models::{Library, LocalizedText, Settings, Template};
use promptfill::system::storage;

/// El punto de entrada principal de la aplicación.
fn main() {
    // Inicializar el logger. Para ver los logs, ejecuta con `RUST_LOG=debug promptfill ...`
    env_logger::init();

    // Parsear los argumentos de la línea de comandos.
    let cli = Cli::parse();

    // Ejecutar la lógica principal y manejar cualquier error.
    if let Err(e) = run_cli(cli) {
        // `eprintln` escribe en stderr, la práctica estándar para errores.
        eprintln!("\nError: {:?}", e);
        std::process::exit(1);
    }
}

/// El despachador principal de la aplicación.
fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let settings =
        storage::load_settings().context("No se pudieron cargar las preferencias.")?;

    // Una bandera puede caer en la posición de la acción ("list --lang en"):
    // se reencamina hacia los argumentos finales antes de despachar.
    let mut flag_args = cli.args.clone();
    let action = match cli.action {
        Some(action) if action.starts_with("--") => {
            flag_args.insert(0, action);
            None
        }
        other => other,
    };
    let lang =
        parse_flag_value(&flag_args, "--lang").unwrap_or_else(|| settings.language.clone());

    match cli.context_or_action.as_deref() {
        // Sin argumentos: la vista de exploración.
        None | Some("list") => handle_list(&lang),

        // Acciones globales que no requieren una plantilla activa.
        Some("new") => handle_new(action),
        Some("banks") => handle_banks(action, &flag_args, &lang),
        Some("import") => handle_import(action),
        Some("lang") => handle_lang(action, settings),

        // Cualquier otra cosa se asume que es una plantilla.
        Some(context) => handle_template_action(context, action, &flag_args, &lang),
    }
}

// --- ACCIONES GLOBALES ---

fn handle_list(lang: &str) -> Result<()> {
    let library = load_merged_library()?;

    println!("Plantillas ({}):", library.templates.len());
    for template in &library.templates {
        let pending = renderer::pending_occurrences(template, &library, lang).len();
        let mut line = format!("  {:<28} {}", template.id, template.name.resolve(lang));
        if !template.tags.is_empty() {
            line.push_str(&format!("  [{}]", template.tags.join(", ")));
        }
        if pending > 0 {
            line.push_str(&format!("  ({} sin valor)", pending));
        }
        println!("{}", line);
    }
    Ok(())
}

fn handle_new(name_arg: Option<String>) -> Result<()> {
    let mut library = load_merged_library()?;
    let theme = ColorfulTheme::default();

    let name = match name_arg.filter(|n| !n.starts_with("--")) {
        Some(name) => name,
        None => Input::with_theme(&theme)
            .with_prompt("Nombre de la plantilla nueva")
            .default("Nueva plantilla".to_string())
            .interact_text()?,
    };
    let content: String = Input::with_theme(&theme)
        .with_prompt("Contenido (con marcadores {{clave}})")
        .default("{{role}}: {{subject}}, {{style_genre}}, {{lighting}}".to_string())
        .interact_text()?;

    let id = templates::add_template(
        &mut library,
        LocalizedText::plain(name),
        LocalizedText::plain(content),
    );
    storage::save_library(&library)?;
    println!("Plantilla '{}' creada.", id);
    Ok(())
}

fn handle_banks(action: Option<String>, args: &[String], lang: &str) -> Result<()> {
    match action.as_deref() {
        None => {
            let library = load_merged_library()?;
            println!("Bancos de palabras ({}):", library.banks.len());
            for (key, bank) in &library.banks {
                let category = library
                    .categories
                    .get(&bank.category)
                    .map(|c| c.label.resolve(lang))
                    .unwrap_or(bank.category.as_str());
                println!(
                    "  {:<22} {:<28} {:<12} {} opciones",
                    key,
                    bank.label.resolve(lang),
                    category,
                    bank.options.len()
                );
            }
            Ok(())
        }
        Some("add") => {
            let positional = non_flag_args(args);
            let (key, value_parts) = positional
                .split_first()
                .ok_or_else(|| anyhow!("Uso: promptfill banks add <banco> <valor>"))?;
            let value = value_parts.join(" ");
            if value.trim().is_empty() {
                return Err(anyhow!("El comando 'banks add' requiere un valor."));
            }

            let mut library = load_merged_library()?;
            let changed =
                banks::add_option(&mut library, key, LocalizedText::plain(value.trim()))?;
            if changed {
                storage::save_library(&library)?;
                println!("Valor añadido al banco '{}'.", key);
            } else {
                println!("El banco '{}' ya contenía ese valor.", key);
            }
            Ok(())
        }
        Some(other) => Err(anyhow!("Acción de bancos desconocida: '{}'.", other)),
    }
}

fn handle_import(token_arg: Option<String>) -> Result<()> {
    let token = token_arg.ok_or_else(|| {
        anyhow!("El comando 'import' requiere un token de compartición.")
    })?;

    let mut library = load_merged_library()?;
    let id = share::import_template(&mut library, &token)
        .context("No se pudo importar el token.")?;
    storage::save_library(&library)?;
    println!("Plantilla importada como '{}'.", id);
    Ok(())
}

fn handle_lang(code_arg: Option<String>, mut settings: Settings) -> Result<()> {
    let Some(code) = code_arg else {
        println!("Idioma actual: {}", settings.language);
        return Ok(());
    };
    settings.language = code;
    storage::save_settings(&settings)
        .context("No se pudieron guardar las preferencias.")?;
    println!("Idioma por defecto: {}", settings.language);
    Ok(())
}

// --- ACCIONES SOBRE UNA PLANTILLA ---

fn handle_template_action(
    context: &str,
    action: Option<String>,
    args: &[String],
    lang: &str,
) -> Result<()> {
    let mut library = load_merged_library()?;
    let template_id = resolve_template_context(&library, context, lang)?;
    log::info!("Plantilla activa: '{}'.", template_id);

    match action.as_deref() {
        None | Some("show") => handle_show(&library, &template_id, lang),
        Some("print") => {
            let template = get_template(&library, &template_id)?;
            println!("{}", renderer::render_template(template, &library, lang));
            Ok(())
        }
        Some("fill") => handle_fill(&mut library, &template_id, lang),
        Some("edit") => handle_edit(&mut library, &template_id, lang),
        Some("dup") => handle_duplicate(&mut library, &template_id, lang),
        Some("delete") => handle_delete(&mut library, &template_id, lang),
        Some("reset") => handle_reset(&mut library, &template_id, lang),
        Some("rename") => handle_rename(&mut library, &template_id, args, lang),
        Some("tags") => handle_tags(&mut library, &template_id, args),
        Some("share") => handle_share(&library, &template_id, args),
        Some(other) => Err(anyhow!(
            "Acción desconocida: '{}'. Prueba 'fill', 'edit', 'print', 'dup', 'delete', 'reset', 'rename', 'tags' o 'share'.",
            other
        )),
    }
}

fn handle_show(library: &Library, template_id: &str, lang: &str) -> Result<()> {
    let template = get_template(library, template_id)?;

    println!("{} — {}", template.id, template.name.resolve(lang));
    if let Some(author) = &template.author {
        println!("Autor: {}", author);
    }
    if !template.tags.is_empty() {
        println!("Etiquetas: {}", template.tags.join(", "));
    }
    println!("\nContenido:\n{}", template.content.variant_for(lang));
    println!(
        "\nPrompt final:\n{}",
        renderer::render_template(template, library, lang)
    );

    let pending = renderer::pending_occurrences(template, library, lang);
    if pending.is_empty() {
        println!("\nTodos los marcadores tienen valor.");
    } else {
        println!("\nMarcadores sin valor:");
        for occurrence in pending {
            println!("  {}", occurrence.key());
        }
    }
    Ok(())
}

/// Recorre los marcadores de la variante activa y ofrece, para cada uno,
/// las opciones de su banco más la entrada de un valor personalizado. Las
/// apariciones vinculadas por grupo se actualizan juntas.
fn handle_fill(library: &mut Library, template_id: &str, lang: &str) -> Result<()> {
    let theme = ColorfulTheme::default();

    // Copia del texto activo: los índices de aparición solo son estables
    // dentro de una pasada, y rellenar no modifica el contenido.
    let content_text = get_template(library, template_id)?
        .content
        .variant_for(lang)
        .to_string();
    let occurrences = linkage::scan_occurrences(&content_text);
    if occurrences.is_empty() {
        println!("La plantilla no tiene marcadores que rellenar.");
        return Ok(());
    }

    for occurrence in occurrences {
        // Datos del banco, clonados antes de tomar el préstamo mutable.
        let Some(bank) = banks::lookup_bank(library, &occurrence.full_key) else {
            log::warn!(
                "La variable '{}' no tiene banco de palabras; se salta.",
                occurrence.full_key
            );
            continue;
        };
        let bank_label = bank.label.resolve(lang).to_string();
        let options = bank.options.clone();

        let current = get_template(library, template_id)?
            .selections
            .get(&occurrence.key())
            .cloned();

        let mut items: Vec<String> =
            options.iter().map(|o| o.resolve(lang).to_string()).collect();
        items.push("+ valor personalizado…".to_string());
        let default_index = options
            .iter()
            .position(|o| selection::is_selected(current.as_ref(), o))
            .unwrap_or(0);

        let Some(choice) = Select::with_theme(&theme)
            .with_prompt(format!("{} ({})", bank_label, occurrence.key()))
            .items(&items)
            .default(default_index)
            .interact_opt()?
        else {
            // Esc: esta aparición se queda como está.
            continue;
        };

        let linked = if choice == options.len() {
            let value: String = Input::with_theme(&theme)
                .with_prompt("Valor nuevo")
                .allow_empty(true)
                .interact_text()?;
            selection::add_custom_and_select(
                library,
                template_id,
                &occurrence.full_key,
                occurrence.index,
                LocalizedText::plain(value.trim()),
            )?
        } else {
            let template = get_template_mut(library, template_id)?;
            selection::handle_select(
                template,
                &occurrence.full_key,
                occurrence.index,
                options[choice].clone(),
            )?
        };

        if linked.len() > 1 {
            println!("  {} apariciones vinculadas actualizadas.", linked.len());
        }
    }

    storage::save_library(library)?;
    println!(
        "\nPrompt final:\n{}",
        renderer::render_template(get_template(library, template_id)?, library, lang)
    );
    Ok(())
}

/// Bucle interactivo de edición con deshacer/rehacer. El historial vive
/// solo durante la sesión; lo que persiste es el contenido final.
fn handle_edit(library: &mut Library, template_id: &str, lang: &str) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut histories = HistoryMap::new();

    loop {
        println!(
            "\n{}",
            get_template(library, template_id)?.content.variant_for(lang)
        );

        let history = histories.entry(template_id);
        let items = [
            "Reemplazar el texto".to_string(),
            format!("Deshacer ({})", history.past_len()),
            format!("Rehacer ({})", history.future_len()),
            "Terminar y guardar".to_string(),
        ];
        let Some(choice) = Select::with_theme(&theme)
            .with_prompt("Edición")
            .items(&items)
            .default(0)
            .interact_opt()?
        else {
            break;
        };

        match choice {
            0 => {
                let current_text = get_template(library, template_id)?
                    .content
                    .variant_for(lang)
                    .to_string();
                let new_text: String = Input::with_theme(&theme)
                    .with_prompt("Texto nuevo")
                    .with_initial_text(current_text)
                    .allow_empty(true)
                    .interact_text()?;

                let template = get_template_mut(library, template_id)?;
                let new_content = replace_variant(&template.content, lang, new_text);
                histories
                    .entry(template_id)
                    .update_content(&mut template.content, new_content, false);
            }
            1 => {
                let template = get_template_mut(library, template_id)?;
                if !histories.entry(template_id).undo(&mut template.content) {
                    println!("Nada que deshacer.");
                }
            }
            2 => {
                let template = get_template_mut(library, template_id)?;
                if !histories.entry(template_id).redo(&mut template.content) {
                    println!("Nada que rehacer.");
                }
            }
            _ => break,
        }
    }

    storage::save_library(library)?;
    println!("Cambios guardados.");
    Ok(())
}

fn handle_duplicate(library: &mut Library, template_id: &str, lang: &str) -> Result<()> {
    let new_id = templates::duplicate_template(library, template_id, lang)?;
    storage::save_library(library)?;
    println!("Duplicada como '{}'.", new_id);
    Ok(())
}

fn handle_delete(library: &mut Library, template_id: &str, lang: &str) -> Result<()> {
    let name = get_template(library, template_id)?.name.resolve(lang).to_string();
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "¿Eliminar '{}'? Esta acción no se puede deshacer.",
            name
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("Operación cancelada.");
        return Ok(());
    }

    templates::delete_template(library, template_id)?;
    storage::save_library(library)?;
    println!("Plantilla eliminada.");
    Ok(())
}

fn handle_reset(library: &mut Library, template_id: &str, lang: &str) -> Result<()> {
    let name = get_template(library, template_id)?.name.resolve(lang).to_string();
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "¿Restaurar '{}' a su versión del sistema? Se perderán tus cambios.",
            name
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("Operación cancelada.");
        return Ok(());
    }

    templates::reset_template(library, template_id)?;
    storage::save_library(library)?;
    println!("Plantilla restaurada.");
    Ok(())
}

fn handle_rename(
    library: &mut Library,
    template_id: &str,
    args: &[String],
    lang: &str,
) -> Result<()> {
    let new_name = non_flag_args(args).join(" ");
    if new_name.trim().is_empty() {
        return Err(anyhow!("Uso: promptfill <plantilla> rename <nombre nuevo>"));
    }

    templates::rename_template(library, template_id, &new_name, lang)?;
    storage::save_library(library)?;
    println!("Plantilla renombrada a '{}'.", new_name.trim());
    Ok(())
}

fn handle_tags(library: &mut Library, template_id: &str, args: &[String]) -> Result<()> {
    let tags = non_flag_args(args);
    templates::set_tags(library, template_id, tags.clone())?;
    storage::save_library(library)?;
    if tags.is_empty() {
        println!("Etiquetas vaciadas.");
    } else {
        println!("Etiquetas: {}", tags.join(", "));
    }
    Ok(())
}

fn handle_share(library: &Library, template_id: &str, args: &[String]) -> Result<()> {
    let template = get_template(library, template_id)?;
    let url = share::share_url(template)?;
    println!("{}", url);

    if has_flag(args, "--open") {
        opener::open(&url).context("No se pudo abrir el navegador.")?;
        println!("Enlace abierto en el navegador.");
    }
    Ok(())
}

// --- UTILIDADES ---

/// Carga la biblioteca guardada y la fusiona con el catálogo del sistema;
/// es el equivalente del arranque en frío de la aplicación.
fn load_merged_library() -> Result<Library> {
    let stored = storage::load_library().context("No se pudo cargar la biblioteca.")?;
    let outcome = merge::merge_library_with_system(&stored);
    for note in &outcome.notes {
        log::info!("{}", note);
    }
    Ok(outcome.library)
}

/// Resuelve el contexto a un id de plantilla: primero id exacto, después
/// nombre resuelto en el idioma activo o cualquier variante, sin distinguir
/// mayúsculas.
fn resolve_template_context(library: &Library, context: &str, lang: &str) -> Result<String> {
    if let Some(template) = library.find_template(context) {
        return Ok(template.id.clone());
    }

    let lowered = context.to_lowercase();
    let mut matches = library.templates.iter().filter(|t| {
        t.name.resolve(lang).to_lowercase() == lowered
            || t.name.variants().iter().any(|v| v.to_lowercase() == lowered)
    });
    if let Some(first) = matches.next() {
        if matches.next().is_some() {
            log::warn!(
                "Varias plantillas se llaman '{}'; se usa '{}'.",
                context,
                first.id
            );
        }
        return Ok(first.id.clone());
    }

    let available: Vec<&str> = library.templates.iter().map(|t| t.id.as_str()).collect();
    Err(anyhow!(
        "No se encontró la plantilla '{}'. Disponibles: {}",
        context,
        available.join(", ")
    ))
}

fn get_template<'a>(library: &'a Library, id: &str) -> Result<&'a Template> {
    library
        .find_template(id)
        .ok_or_else(|| anyhow!("No se encontró la plantilla '{}'.", id))
}

fn get_template_mut<'a>(library: &'a mut Library, id: &str) -> Result<&'a mut Template> {
    library
        .find_template_mut(id)
        .ok_or_else(|| anyhow!("No se encontró la plantilla '{}'.", id))
}

/// Construye el contenido nuevo reemplazando solo la variante del idioma
/// activo; un contenido plano se reemplaza entero.
fn replace_variant(content: &LocalizedText, lang: &str, new_text: String) -> LocalizedText {
    match content {
        LocalizedText::Plain(_) => LocalizedText::Plain(new_text),
        LocalizedText::ByLang(map) => {
            let mut map = map.clone();
            map.insert(lang.to_string(), new_text);
            LocalizedText::ByLang(map)
        }
    }
}

/// Parseo simple de banderas con valor, al estilo `--lang en`.
fn parse_flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|pos| args.get(pos + 1).cloned())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Los argumentos posicionales: fuera banderas y el valor de '--lang'.
fn non_flag_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--lang" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.clone());
    }
    out
}
