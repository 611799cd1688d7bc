//! Tag-anchored cards: a question ending in the flashcards tag, answered
//! by the lines that follow.
//!
//! ```markdown
//! What does `Rc` stand for? #card
//! Reference counted pointer.
//! ^1698765432101
//! ```

use std::ops::Range;

use crate::builders::inline::is_inline_card;
use crate::builders::{card_data, heading_level, identifier, media, BuildContext};
use crate::error::Warning;
use crate::metadata::{self, Accepts};
use crate::patterns::{is_media_file, EMBED, HEADING, LINE_ID};
use crate::types::{Card, Fields};

/// The answer lines of a tag card.
struct Answer {
    body: Range<usize>,
    end: usize,
    id: Option<i64>,
}

/// Read answer lines from `start` up to a blank line, an identifier
/// marker or the end of the note.
fn read_answer(text: &str, start: usize) -> Answer {
    let mut position = start;
    let mut body_end = start;

    for line in text[start..].split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            break;
        }
        if let Some(caps) = LINE_ID.captures(content) {
            let marker = caps.get_match();
            body_end = position + marker.start();
            return Answer {
                body: start..body_end,
                end: position + marker.end(),
                id: identifier(caps.get(1)),
            };
        }
        body_end = position + content.len();
        position += line.len();
    }

    Answer {
        body: start..body_end,
        end: body_end,
        id: None,
    }
}

/// Offset just past the last heading line above the line holding the tag,
/// when question text follows it.
fn past_heading(question: &str) -> Option<usize> {
    let last_newline = question.rfind('\n')?;
    if question[last_newline..].trim().is_empty() {
        return None;
    }
    let mut past = None;
    let mut offset = 0;
    for line in question[..=last_newline].split_inclusive('\n') {
        offset += line.len();
        if HEADING.is_match(line) {
            past = Some(offset);
        }
    }
    past
}

/// Append the content of every embedded note to the answer.
fn expand_embeds(ctx: &BuildContext<'_>, answer: &str) -> String {
    let mut expanded = answer.to_string();
    for caps in EMBED.captures_iter(answer) {
        let target = &caps[1];
        if is_media_file(target) {
            continue;
        }
        match ctx.note.embeds.get(target) {
            Some(content) => {
                expanded.push('\n');
                expanded.push_str(content);
            }
            None => tracing::debug!(target, "no content for embedded note"),
        }
    }
    expanded
}

pub(crate) fn build(ctx: &BuildContext<'_>, warnings: &mut Vec<Warning>) -> Vec<Card> {
    let text = ctx.note.text.as_str();
    let mut cards = Vec::new();
    let mut at = 0;

    while let Some(caps) = ctx.patterns.tag.captures_at(text, at) {
        let whole = caps.get_match();
        let question_end = caps.get(2).map_or(whole.start(), |question| question.end());
        if let Some(past) = past_heading(&text[whole.start()..question_end]) {
            at = whole.start() + past;
            continue;
        }

        let original_question = caps[2].trim();
        let tagged_line = original_question.lines().last().unwrap_or_default();
        if is_inline_card(ctx, tagged_line) {
            tracing::debug!(
                question = tagged_line,
                "tagged inline card left to the inline builder"
            );
            at = whole.end();
            continue;
        }

        let answer = read_answer(text, whole.end());
        at = answer.end.max(whole.end());

        let (back, entries) = metadata::split_tail(&text[answer.body.clone()]);
        if back.is_empty() {
            tracing::debug!(question = original_question, "tag card without answer skipped");
            continue;
        }
        let metadata = metadata::parse(&entries, original_question, Accepts::BASIC, warnings);

        let context = ctx.context(whole.start(), heading_level(caps.get(1)));
        let question = ctx.assemble(&context, original_question);
        let media = media(&[&question, &back], &[&back]);
        let back = expand_embeds(ctx, &back);

        let mut fields = Fields::new();
        fields.insert("Front", ctx.render(&question));
        fields.insert("Back", ctx.render(&back));
        ctx.add_source(&mut fields);

        let mut data = card_data(
            ctx.deck_or(metadata.deck),
            original_question,
            fields,
            whole.start()..answer.end,
            ctx.tags(caps.get(4)),
            answer.id,
            media,
        );
        data.reversed = ctx.patterns.is_reverse_tag(&caps[3]);
        cards.push(Card::Tag(data));
    }

    cards
}
