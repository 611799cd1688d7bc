//! Extraction settings.

use serde::{Deserialize, Serialize};

/// Settings that shape how cards are recognised and assembled.
///
/// Every field has a default, so a partial settings file deserializes into
/// a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix each card's prompt with its ancestor headings.
    pub context_aware_mode: bool,
    /// Add a `Source` field linking back to the note.
    pub source_support: bool,
    /// Joins context headings and the card's own prompt.
    pub context_separator: String,
    /// Deck used when neither the note nor the card names one.
    pub deck: String,
    /// Use the note's folder name as its deck.
    pub folder_based_deck: bool,
    /// Tag (without `#`) that marks tag-anchored and spaced cards.
    pub flashcards_tag: String,
    pub inline_separator: String,
    pub inline_separator_reverse: String,
    /// Tag appended to every extracted card.
    pub default_tag: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            context_aware_mode: true,
            source_support: false,
            context_separator: " > ".to_string(),
            deck: "Default".to_string(),
            folder_based_deck: true,
            flashcards_tag: "card".to_string(),
            inline_separator: "::".to_string(),
            inline_separator_reverse: ":::".to_string(),
            default_tag: Some("obsidian".to_string()),
        }
    }
}

impl Settings {
    /// The configured default tag, ignoring blank values.
    pub fn default_tag(&self) -> Option<&str> {
        self.default_tag
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}
