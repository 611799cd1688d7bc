//! Drops cards that are literal text inside code or math.

use crate::scan::SpanIndex;
use crate::types::Card;

/// Keep only cards not wholly contained in a fenced code block, a math
/// block or an inline math span.
pub fn discard_literal(cards: Vec<Card>, index: &SpanIndex) -> Vec<Card> {
    cards
        .into_iter()
        .filter(|card| {
            let literal = index.in_literal(card.span());
            if literal {
                tracing::debug!(
                    card = %card.data().original_text,
                    kind = card.type_name(),
                    "card inside code or math discarded"
                );
            }
            !literal
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardData, Fields, NEW_CARD_ID};

    fn card(span: std::ops::Range<usize>) -> Card {
        Card::Tag(CardData {
            id: NEW_CARD_ID,
            deck: "Default".to_string(),
            original_text: "Q".to_string(),
            fields: Fields::new(),
            reversed: false,
            span,
            tags: vec![],
            inserted: false,
            media: vec![],
            contains_code: false,
        })
    }

    #[test]
    fn contained_cards_are_dropped() {
        let text = "before\n```\nQ #card\nA\n```\nafter";
        let index = SpanIndex::build(text, false);
        let kept = discard_literal(vec![card(11..20), card(11..28)], &index);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].span(), &(11..28));
    }

    #[test]
    fn inline_math_counts() {
        let index = SpanIndex::build("see $a::b$ here", false);
        assert!(discard_literal(vec![card(5..9)], &index).is_empty());
        assert_eq!(discard_literal(vec![card(0..9)], &index).len(), 1);
    }
}
