// src/cli.rs

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "PromptFill: plantillas de prompts de imagen con bancos de palabras.", long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Plantilla (id o nombre) o una acción global ('list', 'new', 'banks', 'import', 'lang').
    pub context_or_action: Option<String>,

    /// Acción sobre la plantilla ('fill', 'edit', 'print', 'dup', 'delete', 'reset', 'rename', 'tags', 'share').
    #[arg(allow_hyphen_values = true)]
    pub action: Option<String>,

    /// Argumentos restantes para la acción (p. ej. '--lang en', '--open').
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
