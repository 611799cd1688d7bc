//! Note-level declarations: the deck and the tags shared by every card.
//!
//! ```markdown
//! cards-deck: Languages::Spanish
//! tags: [[Vocabulary]] #lang/es grammar
//! ```

use crate::builders::hierarchy;
use crate::patterns::{is_media_file, DECK_DECLARATION, EMBED, GLOBAL_TAG, TAGS_DECLARATION};
use crate::settings::Settings;

/// Deck named by a `cards-deck:` line.
pub fn deck_declaration(text: &str) -> Option<String> {
    DECK_DECLARATION
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|deck| !deck.is_empty())
}

/// Tags listed on a `tags:` or `cards-tags:` line, as links, `#tags` or
/// bare words.
pub fn global_tags(text: &str) -> Vec<String> {
    let Some(caps) = TAGS_DECLARATION.captures(text) else {
        return Vec::new();
    };

    GLOBAL_TAG
        .captures_iter(&caps[1])
        .filter_map(|tag| tag.get(1).or(tag.get(2)).or(tag.get(3)))
        .map(|tag| tag.as_str().trim())
        .filter(|tag| !tag.is_empty())
        .map(hierarchy)
        .collect()
}

/// Deck for a note: its declaration, else its folder name when decks
/// follow folders, else the configured default.
pub fn resolve_deck(text: &str, folder: Option<&str>, settings: &Settings) -> String {
    if let Some(deck) = deck_declaration(text) {
        return deck;
    }
    if settings.folder_based_deck {
        if let Some(folder) = folder.map(str::trim).filter(|folder| !folder.is_empty()) {
            return folder.to_string();
        }
    }
    settings.deck.clone()
}

/// Notes embedded with `![[...]]`, in order of first appearance.
///
/// Hosts read these to fill [`Note::embeds`](crate::types::Note::embeds);
/// embedded media files are not listed.
pub fn embedded_notes(text: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for caps in EMBED.captures_iter(text) {
        let target = caps[1].trim();
        let seen = targets.iter().any(|existing| existing == target);
        if target.is_empty() || seen || is_media_file(target) {
            continue;
        }
        targets.push(target.to_string());
    }
    targets
}
