//! Media collaborators: image upload and speech synthesis.
//!
//! The engine never talks to the network itself. Hosts inject a
//! [`MediaService`]; tests inject fakes.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::MediaError;

/// One example sentence sent along with a combined speech request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentencePair {
    pub front: String,
    pub back: String,
}

/// A request to synthesize speech for card text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechRequest {
    /// Lower-cased language code taken from the deck name.
    pub lang: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sentences: Vec<SentencePair>,
}

impl SpeechRequest {
    pub fn new(lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            text: text.into(),
            sentences: Vec::new(),
        }
    }
}

#[async_trait]
pub trait MediaService: Send + Sync {
    /// Make a note attachment available to the card store.
    async fn upload(&self, file_name: &str) -> Result<(), MediaError>;

    /// Synthesize speech, returning the file name of the produced audio.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Option<String>, MediaError>;
}

/// Media service for offline extraction: uploads succeed without doing
/// anything and no audio is produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMedia;

#[async_trait]
impl MediaService for NoMedia {
    async fn upload(&self, _file_name: &str) -> Result<(), MediaError> {
        Ok(())
    }

    async fn synthesize(&self, _request: &SpeechRequest) -> Result<Option<String>, MediaError> {
        Ok(None)
    }
}

/// Which sides of an inline card get synthesized audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeechSides {
    pub front: bool,
    pub back: bool,
}

/// Decides from a deck name which sides of an inline card are spoken.
pub trait SpeechPolicy: Send + Sync {
    fn sides(&self, deck: &str) -> SpeechSides;
}

impl<F> SpeechPolicy for F
where
    F: Fn(&str) -> SpeechSides + Send + Sync,
{
    fn sides(&self, deck: &str) -> SpeechSides {
        self(deck)
    }
}

/// Deck-name heuristics for Polish-centred language decks.
///
/// The front is spoken unless the deck is a plain `PL-…` deck, except that
/// `-PL`, `Sent` and `Mati` decks are always spoken. The back is spoken for
/// `PL-…` and `Mati` decks.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeckNamePolicy;

impl SpeechPolicy for DeckNamePolicy {
    fn sides(&self, deck: &str) -> SpeechSides {
        let always = deck.contains("Mati");
        SpeechSides {
            front: always || deck.contains("-PL") || deck.contains("Sent") || !deck.contains("PL"),
            back: always || deck.starts_with("PL-"),
        }
    }
}

/// Never synthesize speech.
pub fn silent(_deck: &str) -> SpeechSides {
    SpeechSides::default()
}
