// src/core/history.rs

use crate::constants::HISTORY_SAVE_INTERVAL_MS;
use crate::models::LocalizedText;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Historial de edición de una plantilla: dos pilas de instantáneas del
/// contenido completo más la marca de tiempo del último guardado.
///
/// Las instantáneas se toman como mucho una vez por ventana de un segundo,
/// salvo que la llamada las fuerce; así una racha de tecleo no genera una
/// entrada por pulsación.
#[derive(Debug, Clone, Default)]
pub struct EditorHistory {
    past: Vec<LocalizedText>,
    future: VecDeque<LocalizedText>,
    last_save: Option<Instant>,
}

impl EditorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reemplaza el contenido vivo registrando, si toca, una instantánea
    /// del valor anterior. Una edición nueva siempre vacía la pila de
    /// rehacer, tome o no instantánea.
    pub fn update_content(
        &mut self,
        live: &mut LocalizedText,
        new_content: LocalizedText,
        force_save: bool,
    ) {
        self.update_content_at(live, new_content, force_save, Instant::now());
    }

    /// Variante con reloj inyectable; la usan `update_content` y las pruebas.
    pub fn update_content_at(
        &mut self,
        live: &mut LocalizedText,
        new_content: LocalizedText,
        force_save: bool,
        now: Instant,
    ) {
        let interval = Duration::from_millis(HISTORY_SAVE_INTERVAL_MS);
        let should_save = force_save
            || self
                .last_save
                .map_or(true, |last| now.duration_since(last) > interval);

        if should_save {
            self.past.push(live.clone());
            self.future.clear();
            self.last_save = Some(now);
        } else {
            // Dentro de la ventana: la edición se funde con la última
            // instantánea, pero el rehacer igualmente deja de tener sentido.
            self.future.clear();
        }

        *live = new_content;
    }

    /// Deshace el último cambio sobre `live`. Con el pasado vacío no hace
    /// nada y devuelve `false`; nunca es un error.
    pub fn undo(&mut self, live: &mut LocalizedText) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        self.future.push_front(live.clone());
        *live = previous;
        true
    }

    /// Rehace el último cambio deshecho. Operación espejo de `undo`.
    pub fn redo(&mut self, live: &mut LocalizedText) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        self.past.push(live.clone());
        *live = next;
        true
    }

    /// Vacía ambas pilas y la marca de tiempo. Se invoca al cambiar de
    /// plantilla activa para que el historial nunca se filtre entre
    /// plantillas.
    pub fn reset(&mut self) {
        self.past.clear();
        self.future.clear();
        self.last_save = None;
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}

/// Historiales de edición por id de plantilla. Reiniciar el de una
/// plantilla nunca toca las pilas de las demás.
#[derive(Debug, Default)]
pub struct HistoryMap {
    entries: HashMap<String, EditorHistory>,
}

impl HistoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// El historial de la plantilla, creándolo vacío si aún no existe.
    pub fn entry(&mut self, template_id: &str) -> &mut EditorHistory {
        self.entries.entry(template_id.to_string()).or_default()
    }

    pub fn get(&self, template_id: &str) -> Option<&EditorHistory> {
        self.entries.get(template_id)
    }

    /// Reinicia el historial de una plantilla concreta, si lo hay.
    pub fn reset(&mut self, template_id: &str) {
        if let Some(history) = self.entries.get_mut(template_id) {
            history.reset();
        }
    }
}
