//! Per-card metadata tails.
//!
//! A card may end with `|| key: value` pairs, usually hidden in an
//! Obsidian comment:
//!
//! ```markdown
//! Hola :: Hello %%|| deck: ES-EN || hint: greeting || o: addSentences%%
//! ```

use crate::error::Warning;
use crate::patterns::HTML_TAG;
use crate::types::InlineOptions;

/// Which metadata keys a card type understands. `deck` is always accepted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Accepts {
    pub card_type: &'static str,
    pub hint: bool,
    pub options: bool,
}

impl Accepts {
    pub const BASIC: Self = Self {
        card_type: "tag",
        hint: false,
        options: false,
    };
    pub const SPACED: Self = Self {
        card_type: "spaced",
        hint: false,
        options: false,
    };
    pub const CLOZE: Self = Self {
        card_type: "cloze",
        hint: true,
        options: false,
    };
    pub const INLINE: Self = Self {
        card_type: "inline",
        hint: true,
        options: true,
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Metadata {
    pub deck: Option<String>,
    pub hint: Option<String>,
    pub options: InlineOptions,
}

/// Split card text into its body and raw metadata entries.
///
/// Comment markers (`%%`) are dropped first, so a tail hidden in a
/// comment reads the same as a visible one.
pub(crate) fn split_tail(text: &str) -> (String, Vec<String>) {
    let text = text.replace("%%", "");
    let mut parts = text.split("||");
    let body = parts.next().unwrap_or_default().trim().to_string();
    let entries = parts
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect();
    (body, entries)
}

/// Parse metadata entries. Bad entries are skipped with a warning.
pub(crate) fn parse(
    entries: &[String],
    card: &str,
    accepts: Accepts,
    warnings: &mut Vec<Warning>,
) -> Metadata {
    let mut metadata = Metadata::default();

    for entry in entries {
        let parts: Vec<&str> = entry.split(':').collect();
        let [key, value] = parts.as_slice() else {
            raise(
                warnings,
                Warning::MalformedMetadata {
                    card: card.to_string(),
                    entry: entry.clone(),
                },
            );
            continue;
        };

        let key = strip_tags(key).to_lowercase();
        let value = strip_tags(value);

        if key.contains("deck") || key == "d" {
            metadata.deck = Some(value);
        } else if key.contains("hint") || key == "h" {
            if accepts.hint {
                metadata.hint = Some(value);
            } else {
                unsupported(warnings, card, accepts, key);
            }
        } else if key.contains("options") || key == "o" {
            if accepts.options {
                parse_options(&value, card, &mut metadata.options, warnings);
            } else {
                unsupported(warnings, card, accepts, key);
            }
        } else {
            raise(
                warnings,
                Warning::UnknownMetadataKey {
                    card: card.to_string(),
                    key,
                },
            );
        }
    }

    metadata
}

fn parse_options(
    value: &str,
    card: &str,
    options: &mut InlineOptions,
    warnings: &mut Vec<Warning>,
) {
    for option in value.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        let (name, flag) = match option.split_once('=') {
            Some((name, flag)) => (name.trim(), flag.trim()),
            None => (option, "true"),
        };
        if name.eq_ignore_ascii_case("addSentences") {
            options.add_sentences = !matches!(
                flag.to_lowercase().as_str(),
                "false" | "no" | "off" | "0"
            );
        } else {
            raise(
                warnings,
                Warning::UnknownOption {
                    card: card.to_string(),
                    option: option.to_string(),
                },
            );
        }
    }
}

fn unsupported(warnings: &mut Vec<Warning>, card: &str, accepts: Accepts, key: String) {
    raise(
        warnings,
        Warning::UnsupportedMetadataKey {
            card: card.to_string(),
            card_type: accepts.card_type,
            key,
        },
    );
}

fn strip_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").trim().to_string()
}

pub(crate) fn raise(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{}", warning);
    warnings.push(warning);
}
