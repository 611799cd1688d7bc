//! Spaced cards: a single prompt to recall, marked with the spaced tag.

use crate::builders::{card_data, heading_level, identifier, media, BuildContext};
use crate::error::Warning;
use crate::metadata::{self, Accepts};
use crate::types::{Card, Fields};

pub(crate) fn build(ctx: &BuildContext<'_>, warnings: &mut Vec<Warning>) -> Vec<Card> {
    let text = ctx.note.text.as_str();
    let mut cards = Vec::new();

    for caps in ctx.patterns.spaced.captures_iter(text) {
        let whole = caps.get_match();
        let (prompt, entries) = metadata::split_tail(&caps[2]);
        let metadata = metadata::parse(&entries, &prompt, Accepts::SPACED, warnings);

        let context = ctx.context(whole.start(), heading_level(caps.get(1)));
        let assembled = ctx.assemble(&context, &prompt);
        let media = media(&[&assembled], &[&assembled]);

        let mut fields = Fields::new();
        fields.insert("Prompt", ctx.render(&assembled));
        ctx.add_source(&mut fields);

        // Without a marker the span stops before the line break, so a new
        // marker lands on the following line.
        let id = identifier(caps.get(5));
        let end = match id {
            Some(_) => whole.end(),
            None => whole.start() + whole.as_str().trim_end().len(),
        };

        cards.push(Card::Spaced(card_data(
            ctx.deck_or(metadata.deck),
            &prompt,
            fields,
            whole.start()..end,
            ctx.tags(caps.get(4)),
            id,
            media,
        )));
    }

    cards
}
