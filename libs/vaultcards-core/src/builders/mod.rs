//! Card builders, one per card syntax.
//!
//! Each builder walks the note with its own pattern and turns matches
//! into cards. Steps shared by all of them live here: heading level,
//! context chain, prompt assembly, tags, identifiers and the code flag.

pub(crate) mod cloze;
pub(crate) mod inline;
pub(crate) mod spaced;
pub(crate) mod tag;

use std::ops::Range;

use regex::Match;

use crate::context::resolve_context;
use crate::normalize::{extract_audio_links, extract_image_links, Normalizer};
use crate::patterns::{CardPatterns, CODE_SPAN};
use crate::scan::SpanIndex;
use crate::settings::Settings;
use crate::types::{CardData, Fields, Note, NEW_CARD_ID};

/// Everything a builder reads during one extraction.
pub(crate) struct BuildContext<'a> {
    pub note: &'a Note,
    /// Deck for cards that do not name their own.
    pub deck: &'a str,
    pub index: &'a SpanIndex,
    pub settings: &'a Settings,
    pub patterns: &'a CardPatterns,
    pub normalizer: &'a Normalizer,
    /// Rendered link back to the note, when source attribution is on.
    pub source: Option<String>,
}

impl BuildContext<'_> {
    /// Ancestor headings of a card starting at `position`, or nothing when
    /// context-aware mode is off.
    pub fn context(&self, position: usize, heading_level: Option<usize>) -> Vec<String> {
        if !self.settings.context_aware_mode {
            return Vec::new();
        }
        resolve_context(&self.index.headings, position, heading_level)
    }

    /// Own text prefixed with its context chain.
    pub fn assemble(&self, context: &[String], text: &str) -> String {
        if context.is_empty() {
            return text.to_string();
        }
        let mut parts: Vec<&str> = context.iter().map(String::as_str).collect();
        parts.push(text);
        parts.join(&self.settings.context_separator)
    }

    pub fn render(&self, text: &str) -> String {
        self.normalizer.render_line(text, &self.note.vault)
    }

    /// Deck named by card metadata, else the note's deck.
    pub fn deck_or(&self, deck: Option<String>) -> String {
        deck.unwrap_or_else(|| self.deck.to_string())
    }

    pub fn add_source(&self, fields: &mut Fields) {
        if let Some(source) = &self.source {
            fields.insert("Source", source.clone());
        }
    }

    /// Note tags plus the per-card tags of a match.
    pub fn tags(&self, raw: Option<Match<'_>>) -> Vec<String> {
        let mut tags = self.note.global_tags.clone();
        if let Some(raw) = raw {
            tags.extend(parse_tags(raw.as_str()));
        }
        tags
    }
}

/// Level of a leading `#` run, or `None` when the card is not a heading.
pub(crate) fn heading_level(run: Option<Match<'_>>) -> Option<usize> {
    run.map(|run| run.as_str().trim().len())
        .filter(|level| *level > 0)
}

/// Split `#a #b/c` into tags, mapping hierarchy delimiters to `::`.
pub(crate) fn parse_tags(raw: &str) -> Vec<String> {
    raw.split('#')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(hierarchy)
        .collect()
}

pub(crate) fn hierarchy(tag: &str) -> String {
    tag.replace(['/', '\\'], "::")
}

pub(crate) fn identifier(raw: Option<Match<'_>>) -> Option<i64> {
    raw.and_then(|raw| raw.as_str().parse().ok())
}

/// Image and audio references, in the order the card renders them.
pub(crate) fn media(image_sources: &[&str], audio_sources: &[&str]) -> Vec<String> {
    image_sources
        .iter()
        .flat_map(|text| extract_image_links(text))
        .chain(audio_sources.iter().flat_map(|text| extract_audio_links(text)))
        .collect()
}

/// Shared card attributes. `reversed` starts false and `contains_code` is
/// read from the fields.
pub(crate) fn card_data(
    deck: String,
    original_text: &str,
    fields: Fields,
    span: Range<usize>,
    tags: Vec<String>,
    id: Option<i64>,
    media: Vec<String>,
) -> CardData {
    let contains_code = fields.values().any(|value| CODE_SPAN.is_match(value));
    CardData {
        id: id.unwrap_or(NEW_CARD_ID),
        deck,
        original_text: original_text.to_string(),
        fields,
        reversed: false,
        span,
        tags,
        inserted: id.is_some(),
        media,
        contains_code,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;

    #[test]
    fn tags_map_both_hierarchy_delimiters() {
        assert_eq!(
            parse_tags(" #parent\\child #a/b #plain"),
            vec!["parent::child", "a::b", "plain"]
        );
    }

    #[test]
    fn assemble_joins_context() {
        let fixture = Fixture::new("");
        let ctx = fixture.context();
        let context = vec!["A".to_string(), "B".to_string()];
        assert_eq!(ctx.assemble(&context, "Q"), "A > B > Q");
        assert_eq!(ctx.assemble(&[], "Q"), "Q");
    }

    #[test]
    fn context_is_empty_when_mode_is_off() {
        let settings = Settings {
            context_aware_mode: false,
            ..Settings::default()
        };
        let fixture = Fixture::with_settings("# A\ntext", settings);
        assert!(fixture.context().context(5, None).is_empty());
    }

    #[test]
    fn card_data_flags_code_and_ids() {
        let mut fields = Fields::new();
        fields.insert("Front", "<p><code>let x</code></p>");
        let data = card_data(
            "Deck".to_string(),
            "Q",
            fields,
            0..1,
            vec![],
            Some(1234567890123),
            vec![],
        );
        assert!(data.contains_code);
        assert!(data.inserted);
        assert_eq!(data.id, 1234567890123);
    }
}
