//! Error and warning types for vaultcards-core.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using ExtractError.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that prevent an extractor from being built.
///
/// Extraction itself never fails: problems with individual cards are
/// reported as [`Warning`]s next to the cards that were built.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid card pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors raised by a media collaborator (upload or speech synthesis).
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Media service error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Non-fatal problems found while building cards.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    #[error("malformed metadata entry {entry:?} on card {card:?}")]
    MalformedMetadata { card: String, entry: String },

    #[error("unknown metadata key {key:?} on card {card:?}")]
    UnknownMetadataKey { card: String, key: String },

    #[error("metadata key {key:?} is not supported on {card_type} cards ({card:?})")]
    UnsupportedMetadataKey {
        card: String,
        card_type: &'static str,
        key: String,
    },

    #[error("unknown option {option:?} on card {card:?}")]
    UnknownOption { card: String, option: String },

    #[error("deck {deck:?} does not name a language pair, audio skipped for {card:?}")]
    UnrecognizedDeckPattern { card: String, deck: String },

    #[error("media request for {card:?} failed: {message}")]
    MediaFailure { card: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_error_display() {
        let error = MediaError::Backend {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(error.to_string(), "Media service error: 502 - bad gateway");
    }

    #[test]
    fn warning_display_names_the_entry() {
        let warning = Warning::MalformedMetadata {
            card: "Hello".to_string(),
            entry: "deck".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "malformed metadata entry \"deck\" on card \"Hello\""
        );
    }

    #[test]
    fn warning_serializes_with_kind_tag() {
        let warning = Warning::UnrecognizedDeckPattern {
            card: "Hello".to_string(),
            deck: "Default".to_string(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "unrecognized_deck_pattern");
        assert_eq!(json["deck"], "Default");
    }
}
