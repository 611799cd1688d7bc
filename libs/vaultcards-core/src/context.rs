//! Ancestor heading chains for context-aware cards.

use crate::types::Heading;

/// Ancestor heading titles of a card, outermost first.
///
/// Only headings starting before `position` are considered. With an
/// explicit heading level (the card itself is a heading), the chain starts
/// at the nearest preceding heading one level up. Otherwise it starts at
/// the nearest preceding heading of any level. Each further member is the
/// nearest earlier heading exactly one level above the previous member.
pub fn resolve_context(
    headings: &[Heading],
    position: usize,
    explicit_level: Option<usize>,
) -> Vec<String> {
    let mut context = Vec::new();
    let mut current = position;
    let mut remaining = headings.iter().rev();

    let mut goal = match explicit_level {
        Some(level) => level.saturating_sub(1),
        None => {
            let Some(nearest) = remaining.find(|heading| heading.offset < current) else {
                return context;
            };
            current = nearest.offset;
            context.push(nearest.text.clone());
            nearest.level.saturating_sub(1)
        }
    };

    for heading in remaining {
        if goal == 0 {
            break;
        }
        if heading.level == goal && heading.offset < current {
            current = heading.offset;
            context.push(heading.text.clone());
            goal -= 1;
        }
    }

    context.reverse();
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: usize, text: &str, offset: usize) -> Heading {
        Heading {
            level,
            text: text.to_string(),
            offset,
        }
    }

    #[test]
    fn paragraph_card_collects_full_chain() {
        let headings = vec![heading(1, "A", 0), heading(2, "B", 10)];
        assert_eq!(resolve_context(&headings, 20, None), vec!["A", "B"]);
    }

    #[test]
    fn skips_siblings_and_deeper_headings() {
        let headings = vec![
            heading(1, "Root", 0),
            heading(2, "First", 10),
            heading(3, "Deep", 20),
            heading(2, "Second", 30),
        ];
        assert_eq!(
            resolve_context(&headings, 40, None),
            vec!["Root", "Second"]
        );
    }

    #[test]
    fn explicit_level_excludes_own_heading() {
        let headings = vec![
            heading(1, "Root", 0),
            heading(2, "Parent", 10),
            heading(3, "Question", 20),
        ];
        assert_eq!(
            resolve_context(&headings, 20, Some(3)),
            vec!["Root", "Parent"]
        );
    }

    #[test]
    fn headings_after_position_are_ignored() {
        let headings = vec![heading(1, "Later", 50)];
        assert!(resolve_context(&headings, 20, None).is_empty());
        assert!(resolve_context(&headings, 20, Some(2)).is_empty());
    }

    #[test]
    fn no_headings_gives_empty_chain() {
        assert!(resolve_context(&[], 5, None).is_empty());
    }
}
