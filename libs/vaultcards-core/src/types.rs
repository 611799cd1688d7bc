//! Core types: notes in, cards out.

use std::collections::HashMap;
use std::ops::Range;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Warning;

/// Id of a card that has not been synced yet.
pub const NEW_CARD_ID: i64 = -1;

/// A markdown heading found in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Number of `#` characters (1-6).
    pub level: usize,
    pub text: String,
    /// Byte offset of the heading line.
    pub offset: usize,
}

/// Insertion-ordered card fields.
///
/// Field order is meaningful to the card store (it maps onto note type
/// field order), so this keeps fields in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing the value in place if the name exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Attributes shared by every card variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardData {
    /// [`NEW_CARD_ID`] for new cards, else the id recovered from the note.
    pub id: i64,
    pub deck: String,
    /// The source snippet the card was built from.
    pub original_text: String,
    pub fields: Fields,
    /// Whether a mirrored card should also be created.
    pub reversed: bool,
    /// Byte range of the card in the note text.
    pub span: Range<usize>,
    pub tags: Vec<String>,
    /// True when the id came from an identifier marker in the note.
    pub inserted: bool,
    /// Media file names referenced by the card.
    pub media: Vec<String>,
    pub contains_code: bool,
}

/// Flags recognised in the `options` metadata of inline cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InlineOptions {
    /// Collect the note's sentence cards into a `Sentences` field.
    pub add_sentences: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineCard {
    #[serde(flatten)]
    pub data: CardData,
    pub options: InlineOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClozeCard {
    #[serde(flatten)]
    pub data: CardData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub extra: String,
}

/// A card extracted from a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Card {
    /// Question followed by the flashcards tag, answer on the next lines.
    Tag(CardData),
    /// `question :: answer` on one line.
    Inline(InlineCard),
    /// A single prompt marked with the spaced tag.
    Spaced(CardData),
    Cloze(ClozeCard),
}

impl Card {
    pub fn data(&self) -> &CardData {
        match self {
            Card::Tag(data) | Card::Spaced(data) => data,
            Card::Inline(card) => &card.data,
            Card::Cloze(card) => &card.data,
        }
    }

    pub fn data_mut(&mut self) -> &mut CardData {
        match self {
            Card::Tag(data) | Card::Spaced(data) => data,
            Card::Inline(card) => &mut card.data,
            Card::Cloze(card) => &mut card.data,
        }
    }

    /// Short name of the variant, as used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Card::Tag(_) => "tag",
            Card::Inline(_) => "inline",
            Card::Spaced(_) => "spaced",
            Card::Cloze(_) => "cloze",
        }
    }

    pub fn span(&self) -> &Range<usize> {
        &self.data().span
    }

    pub fn fields(&self) -> &Fields {
        &self.data().fields
    }
}

/// Embed target → content to append when the target is embedded.
pub type EmbedMap = HashMap<String, String>;

/// A note to extract cards from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Note {
    pub text: String,
    pub deck: String,
    pub vault: String,
    pub title: String,
    pub global_tags: Vec<String>,
    pub embeds: EmbedMap,
}

impl Note {
    pub fn new(text: impl Into<String>, deck: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            deck: deck.into(),
            ..Self::default()
        }
    }

    pub fn with_vault(mut self, vault: impl Into<String>) -> Self {
        self.vault = vault.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_global_tags(mut self, tags: Vec<String>) -> Self {
        self.global_tags = tags;
        self
    }

    pub fn with_embeds(mut self, embeds: EmbedMap) -> Self {
        self.embeds = embeds;
        self
    }
}

/// An identifier marker (`^` followed by 13 digits) found in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdMarker {
    pub id: i64,
    /// Byte range of the marker, including trailing whitespace.
    pub span: Range<usize>,
}

/// Cards built from one note, with the warnings raised along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub cards: Vec<Card>,
    pub warnings: Vec<Warning>,
}
