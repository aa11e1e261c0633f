//! Static model registry
//!
//! Maps the human-readable labels students pick from to the provider model
//! identifiers sent on the wire. The table is immutable and process-wide.

use crate::error::{Result, TutorError};
use serde::Serialize;

/// One selectable model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    /// Label shown to the student
    pub label: &'static str,
    /// Provider model identifier
    pub id: &'static str,
    /// Short explanation of when to pick this model
    pub description: &'static str,
}

const ENTRIES: &[ModelEntry] = &[
    ModelEntry {
        label: "⚡ Rápido (Llama 3.1 8B Instant)",
        id: "llama-3.1-8b-instant",
        description: "Modelo ligero y veloz de Meta. Ideal para saludos, definiciones simples o cuando necesitás una respuesta inmediata.",
    },
    ModelEntry {
        label: "🧠 Potente (Llama 3.3 70B Versatile)",
        id: "llama-3.3-70b-versatile",
        description: "Modelo avanzado de gran capacidad. Usalo para razonamiento complejo, redacción detallada, seguridad o análisis de textos.",
    },
    ModelEntry {
        label: "✍️ Creativo (Gemma 2 9B IT)",
        id: "gemma2-9b-it",
        description: "Modelo de Google optimizado para instrucciones. Suele tener un tono más imaginativo, ideal para lluvias de ideas o juegos.",
    },
];

/// Read-only access to the model table
///
/// # Examples
///
/// ```
/// use tutorchat::registry::ModelRegistry;
///
/// assert_eq!(ModelRegistry::default_model(), "llama-3.1-8b-instant");
/// let entry = ModelRegistry::resolve("2").unwrap();
/// assert_eq!(entry.id, "llama-3.3-70b-versatile");
/// ```
pub struct ModelRegistry;

impl ModelRegistry {
    /// All entries in display order
    pub fn entries() -> &'static [ModelEntry] {
        ENTRIES
    }

    /// Identifier of the first entry, used for new sessions
    pub fn default_model() -> &'static str {
        ENTRIES[0].id
    }

    /// Look up an entry by its exact display label
    pub fn by_label(label: &str) -> Option<&'static ModelEntry> {
        ENTRIES.iter().find(|e| e.label == label)
    }

    /// Look up an entry by its provider identifier
    pub fn by_id(id: &str) -> Option<&'static ModelEntry> {
        ENTRIES.iter().find(|e| e.id == id)
    }

    /// Resolve user input to an entry
    ///
    /// Accepts an exact label, an exact identifier, or a 1-based position in
    /// the table.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::UnknownModel` when nothing matches.
    pub fn resolve(input: &str) -> Result<&'static ModelEntry> {
        let input = input.trim();
        if let Some(entry) = Self::by_label(input).or_else(|| Self::by_id(input)) {
            return Ok(entry);
        }
        if let Ok(index) = input.parse::<usize>() {
            if index >= 1 {
                if let Some(entry) = ENTRIES.get(index - 1) {
                    return Ok(entry);
                }
            }
        }
        Err(TutorError::UnknownModel(input.to_string()).into())
    }

    /// Display label for an identifier, falling back to the identifier itself
    pub fn label_for(id: &str) -> &str {
        Self::by_id(id).map(|e| e.label).unwrap_or(id)
    }
}
