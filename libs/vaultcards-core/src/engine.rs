//! The extraction engine: builders, filter, ordering and default tag.

use std::sync::Arc;

use crate::builders::{cloze, inline, spaced, tag, BuildContext};
use crate::error::Result;
use crate::filter::discard_literal;
use crate::ids;
use crate::markdown::{MarkdownRenderer, PulldownRenderer};
use crate::media::{DeckNamePolicy, MediaService, NoMedia, SpeechPolicy};
use crate::normalize::{rewrite_note_links, Normalizer};
use crate::patterns::CardPatterns;
use crate::scan::SpanIndex;
use crate::settings::Settings;
use crate::types::{Extraction, IdMarker, Note};

/// Extracts cards from notes.
///
/// Patterns are compiled once from the settings; collaborators default to
/// pulldown-cmark rendering, no media service and the deck-name speech
/// heuristics.
#[derive(Clone)]
pub struct Extractor {
    settings: Settings,
    patterns: CardPatterns,
    normalizer: Normalizer,
    media: Arc<dyn MediaService>,
    speech: Arc<dyn SpeechPolicy>,
}

impl Extractor {
    pub fn new(settings: Settings) -> Result<Self> {
        let patterns = CardPatterns::new(&settings)?;
        Ok(Self {
            settings,
            patterns,
            normalizer: Normalizer::new(Arc::new(PulldownRenderer::new())),
            media: Arc::new(NoMedia),
            speech: Arc::new(DeckNamePolicy),
        })
    }

    pub fn with_media(mut self, media: Arc<dyn MediaService>) -> Self {
        self.media = media;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        self.normalizer = Normalizer::new(renderer);
        self
    }

    pub fn with_speech_policy(mut self, speech: Arc<dyn SpeechPolicy>) -> Self {
        self.speech = speech;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Extract every card of a note.
    ///
    /// Cards come back ordered by end offset. Problems with single cards
    /// are reported as warnings and never abort the extraction.
    pub async fn extract(&self, note: &Note) -> Extraction {
        let index = SpanIndex::build(&note.text, self.settings.context_aware_mode);
        let deck = if note.deck.trim().is_empty() {
            self.settings.deck.as_str()
        } else {
            note.deck.as_str()
        };
        let source = self
            .settings
            .source_support
            .then(|| rewrite_note_links(&format!("[[{}]]", note.title), &note.vault));

        let ctx = BuildContext {
            note,
            deck,
            index: &index,
            settings: &self.settings,
            patterns: &self.patterns,
            normalizer: &self.normalizer,
            source,
        };

        let mut warnings = Vec::new();
        let mut cards = tag::build(&ctx, &mut warnings);
        let media = self.media.as_ref();
        cards.extend(inline::build(&ctx, media, self.speech.as_ref(), &mut warnings).await);
        cards.extend(spaced::build(&ctx, &mut warnings));
        cards.extend(cloze::build(&ctx, &mut warnings));

        let mut cards = discard_literal(cards, &index);
        cards.sort_by_key(|card| card.span().end);

        if let Some(default_tag) = self.settings.default_tag() {
            for card in &mut cards {
                card.data_mut().tags.push(default_tag.to_string());
            }
        }

        tracing::debug!(
            note = %note.title,
            cards = cards.len(),
            warnings = warnings.len(),
            "extracted cards"
        );
        Extraction { cards, warnings }
    }

    /// Ids of cards deleted from the note but still marked in it.
    pub fn find_deletion_candidates(&self, text: &str) -> Vec<i64> {
        ids::find_deletion_candidates(text)
    }

    /// Every identifier marker in the note.
    pub fn find_existing_ids(&self, text: &str) -> Vec<IdMarker> {
        ids::find_existing_ids(text)
    }
}
