//! Writing identifier markers back into notes.
//!
//! Once the card store has assigned ids to new cards, each card gets a
//! `^<13 digits>` marker at the end of its span so the next extraction
//! recovers the id and updates the card in place.

use crate::patterns::{ID_MARKER, ORPHAN_ID};
use crate::types::{Card, IdMarker};

impl Card {
    /// Marker text inserted at the end of this card's span.
    ///
    /// Inline cards keep the marker on their own line; the other kinds put
    /// it on the line below, where their patterns look for it.
    pub fn id_marker(&self, id: i64) -> String {
        match self {
            Card::Inline(_) => format!(" ^{id}"),
            Card::Tag(_) | Card::Spaced(_) | Card::Cloze(_) => format!("\n^{id}"),
        }
    }
}

/// Insert markers for newly assigned ids.
///
/// Markers are written in ascending end offset, so each insertion only
/// shifts text that has already been copied. Cards that already carry a
/// marker are left alone.
pub fn inject_ids(text: &str, assignments: &[(&Card, i64)]) -> String {
    let mut pending: Vec<&(&Card, i64)> = assignments
        .iter()
        .filter(|(card, _)| !card.data().inserted)
        .collect();
    if pending.is_empty() {
        return text.to_string();
    }
    pending.sort_by_key(|(card, _)| card.span().end);

    let mut result = String::with_capacity(text.len() + pending.len() * 16);
    let mut copied = 0;
    for (card, id) in pending {
        let end = card.span().end.clamp(copied, text.len());
        result.push_str(&text[copied..end]);
        result.push_str(&card.id_marker(*id));
        copied = end;
    }
    result.push_str(&text[copied..]);
    result
}

/// Every identifier marker in a note.
pub fn find_existing_ids(text: &str) -> Vec<IdMarker> {
    ID_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let id = caps[1].parse().ok()?;
            Some(IdMarker {
                id,
                span: caps.get_match().range(),
            })
        })
        .collect()
}

/// Ids whose marker has no card content above it, i.e. cards deleted from
/// the note that should be removed from the store.
pub fn find_deletion_candidates(text: &str) -> Vec<i64> {
    ORPHAN_ID
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}
