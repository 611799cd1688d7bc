//! Flashcard extraction from markdown notes.
//!
//! Provides:
//! - Card builders for tag, inline, spaced and cloze syntaxes
//! - Context chains built from the note's heading hierarchy
//! - Media and link normalization with pluggable markdown rendering
//! - Injected media services for image upload and speech synthesis
//! - Identifier marker reconciliation and insertion
//!
//! ```no_run
//! # async fn demo() -> vaultcards_core::Result<()> {
//! use vaultcards_core::{Extractor, Note, Settings};
//!
//! let extractor = Extractor::new(Settings::default())?;
//! let note = Note::new("# Spanish\nHola :: Hello\n", "ES-EN");
//! let extraction = extractor.extract(&note).await;
//! for card in &extraction.cards {
//!     println!("{} {:?}", card.type_name(), card.fields());
//! }
//! # Ok(())
//! # }
//! ```

mod builders;
pub mod context;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ids;
pub mod markdown;
pub mod media;
mod metadata;
pub mod normalize;
pub mod note;
pub mod patterns;
pub mod scan;
pub mod settings;
pub mod types;

pub use engine::Extractor;
pub use error::{ExtractError, MediaError, Result, Warning};
pub use ids::{find_deletion_candidates, find_existing_ids, inject_ids};
pub use markdown::{MarkdownRenderer, PulldownRenderer};
pub use media::{
    silent, DeckNamePolicy, MediaService, NoMedia, SentencePair, SpeechPolicy, SpeechRequest,
    SpeechSides,
};
pub use normalize::Normalizer;
pub use note::{deck_declaration, embedded_notes, global_tags, resolve_deck};
pub use settings::Settings;
pub use types::{
    Card, CardData, ClozeCard, EmbedMap, Extraction, Fields, Heading, IdMarker, InlineCard,
    InlineOptions, Note, NEW_CARD_ID,
};
