//! Cloze cards: lines with `{hidden}` or `==hidden==` spans.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::builders::{card_data, heading_level, identifier, media, BuildContext};
use crate::error::Warning;
use crate::metadata::{self, Accepts};
use crate::patterns::{CLOZE_CURLY, CLOZE_HIGHLIGHT, HTML_TAG};
use crate::types::{Card, ClozeCard, Fields};

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%%.+?%%").unwrap());
static ASIDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.+?\)").unwrap());

/// The line as plain context for the back of the card.
fn extra(line: &str) -> String {
    let line = line.replace("==", "");
    let line = HTML_TAG.replace_all(&line, "");
    let line = COMMENT.replace_all(&line, "");
    let line = ASIDE.replace_all(&line, "");
    line.split("||").next().unwrap_or_default().trim().to_string()
}

/// Rewrite cloze tokens into `{{cN::text}}`. Curly tokens inside math are
/// left alone; `line_start` maps them back to note offsets.
fn substitute(ctx: &BuildContext<'_>, line: &str, line_start: usize) -> String {
    let curly = CLOZE_CURLY.replace_all(line, |caps: &Captures<'_>| {
        let token = caps.get_match();
        let span = line_start + token.start()..line_start + token.end();
        if ctx.index.in_math(&span) {
            return token.as_str().to_string();
        }
        let number = caps.get(1).map_or("1", |number| number.as_str());
        format!("{{{{c{}::{}}}}}", number, &caps[2])
    });
    CLOZE_HIGHLIGHT
        .replace_all(&curly, "{{c1::$1}}")
        .into_owned()
}

pub(crate) fn build(ctx: &BuildContext<'_>, warnings: &mut Vec<Warning>) -> Vec<Card> {
    let text = ctx.note.text.as_str();
    let mut cards = Vec::new();

    for caps in ctx.patterns.cloze.captures_iter(text) {
        let whole = caps.get_match();
        let Some(line) = caps.get(2) else {
            continue;
        };

        let clozed = substitute(ctx, line.as_str(), line.start());
        if clozed == line.as_str() {
            tracing::debug!(line = line.as_str(), "cloze tokens all inside math, skipped");
            continue;
        }

        let original_line = line.as_str().trim();
        let extra_text = extra(line.as_str());
        let (body, entries) = metadata::split_tail(&clozed);
        let metadata = metadata::parse(&entries, original_line, Accepts::CLOZE, warnings);

        let context = ctx.context(whole.start(), heading_level(caps.get(1)));
        let assembled = ctx.assemble(&context, &body);
        let media = media(&[&assembled], &[&assembled]);

        let mut fields = Fields::new();
        fields.insert("Text", ctx.render(&assembled));
        fields.insert("Extra", extra_text.clone());
        if let Some(hint) = &metadata.hint {
            fields.insert("Hint", hint.clone());
        }
        ctx.add_source(&mut fields);

        let data = card_data(
            ctx.deck_or(metadata.deck),
            original_line,
            fields,
            whole.range(),
            ctx.tags(caps.get(4)),
            identifier(caps.get(5)),
            media,
        );
        cards.push(Card::Cloze(ClozeCard {
            data,
            hint: metadata.hint,
            extra: extra_text,
        }));
    }

    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::Fixture;
    use pretty_assertions::assert_eq;

    fn build_cards(text: &str) -> (Vec<Card>, Vec<Warning>) {
        let fixture = Fixture::new(text);
        let mut warnings = Vec::new();
        let cards = build(&fixture.context(), &mut warnings);
        (cards, warnings)
    }

    #[test]
    fn numbered_and_bare_tokens() {
        let (cards, _) = build_cards("{c2::x} and {y}");
        assert_eq!(
            cards[0].fields().get("Text"),
            Some("<p>{{c2::x}} and {{c1::y}}</p>")
        );
    }

    #[test]
    fn short_index_forms() {
        let (cards, _) = build_cards("{3:a} {4::b} {c5:c}");
        assert_eq!(
            cards[0].fields().get("Text"),
            Some("<p>{{c3::a}} {{c4::b}} {{c5::c}}</p>")
        );
    }

    #[test]
    fn highlights_become_first_cloze() {
        let (cards, _) = build_cards("The ==mitochondria== is the powerhouse");
        assert_eq!(
            cards[0].fields().get("Text"),
            Some("<p>The {{c1::mitochondria}} is the powerhouse</p>")
        );
        assert_eq!(
            cards[0].fields().get("Extra"),
            Some("The mitochondria is the powerhouse")
        );
    }

    #[test]
    fn braces_inside_math_give_no_card() {
        let (cards, _) = build_cards("Half is $\\frac{1}{2}$ here");
        assert!(cards.is_empty());
    }

    #[test]
    fn math_braces_kept_next_to_real_cloze() {
        let (cards, _) = build_cards("{Area} is $\\pi{r}$");
        let text = cards[0].fields().get("Text").unwrap();
        assert!(text.starts_with("<p>{{c1::Area}} is"));
        assert!(!text.contains("c1::r"));
    }

    #[test]
    fn trailing_identifier_and_hint() {
        let (cards, warnings) =
            build_cards("Paris is the capital of {France} %%|| h: Europe%% ^1111111111111");
        assert!(warnings.is_empty());
        let Card::Cloze(card) = &cards[0] else {
            panic!("expected a cloze card");
        };
        assert_eq!(card.data.id, 1111111111111);
        assert!(card.data.inserted);
        assert_eq!(card.hint.as_deref(), Some("Europe"));
        assert_eq!(card.data.fields.get("Hint"), Some("Europe"));
        assert_eq!(card.extra, "Paris is the capital of {France}");
        assert_eq!(
            card.data.fields.names().collect::<Vec<_>>(),
            vec!["Text", "Extra", "Hint"]
        );
    }

    #[test]
    fn identifier_on_next_line() {
        let (cards, _) = build_cards("Capital of {France}\n^1111111111111\n");
        assert_eq!(cards[0].data().id, 1111111111111);
    }

    #[test]
    fn options_are_rejected() {
        let (cards, warnings) = build_cards("{x} || o: addSentences");
        assert_eq!(cards.len(), 1);
        assert!(matches!(
            warnings[0],
            Warning::UnsupportedMetadataKey { card_type: "cloze", .. }
        ));
    }
}
