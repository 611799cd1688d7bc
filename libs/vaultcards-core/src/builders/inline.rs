//! Inline cards: `question :: answer` on a single line.
//!
//! Inline cards are the language-learning workhorse, so this builder also
//! handles pronunciation hints, image uploads, synthesized audio and the
//! `addSentences` aggregation pass.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::builders::{card_data, heading_level, identifier, media, BuildContext};
use crate::error::Warning;
use crate::media::{MediaService, SentencePair, SpeechPolicy, SpeechRequest};
use crate::metadata::{self, raise, Accepts};
use crate::patterns::{HINT_IMAGE, HTML_TAG, LANGUAGE_PAIR, PICTURE_IMAGE, SENTENCE_DECK};
use crate::types::{Card, Fields, InlineCard};

static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.?p>").unwrap());
static TRAILING_BRACKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.+$").unwrap());
static TRAILING_ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<a.+$").unwrap());
static BEFORE_BRACKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.+\[").unwrap());
static AFTER_BRACKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\].+$").unwrap());
static SENTENCE_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.?p(.+?)?>|<.?a(.+?)?>").unwrap());

/// Lines that look like inline cards but are note structure.
const STRUCTURAL_PREFIXES: &[&str] = &["cards-deck", "tags"];
const BREADCRUMBS: &[&str] = &["up", "down", "same"];

/// A matched line, read before any media request is made.
struct Candidate {
    span: Range<usize>,
    heading_level: Option<usize>,
    question: String,
    answer: String,
    reversed: bool,
    tags: Vec<String>,
    id: Option<i64>,
}

fn is_structural(question: &str) -> bool {
    let lower = question.to_lowercase();
    STRUCTURAL_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
        || BREADCRUMBS.contains(&lower.trim())
}

/// Whether the separator sits inside an open `{`, as in `{c1::text}`.
fn inside_cloze(question: &str) -> bool {
    question.matches('{').count() > question.matches('}').count()
}

/// Whether `line` is one the inline builder turns into a card.
pub(crate) fn is_inline_card(ctx: &BuildContext<'_>, line: &str) -> bool {
    ctx.patterns.inline.captures_iter(line).any(|caps| {
        let question = caps[2].trim();
        !is_structural(question) && !inside_cloze(question)
    })
}

fn candidates(ctx: &BuildContext<'_>) -> Vec<Candidate> {
    ctx.patterns
        .inline
        .captures_iter(&ctx.note.text)
        .filter_map(|caps| {
            let question = caps[2].trim();
            if is_structural(question) || inside_cloze(question) {
                tracing::debug!(question, "not an inline card");
                return None;
            }
            Some(Candidate {
                span: caps.get_match().range(),
                heading_level: heading_level(caps.get(1)),
                question: question.to_string(),
                answer: caps[4].trim().to_string(),
                reversed: ctx.patterns.is_reverse_separator(&caps[3]),
                tags: ctx.tags(caps.get(5)),
                id: identifier(caps.get(6)),
            })
        })
        .collect()
}

/// Rendered side without paragraph markup or trailing hints and links.
fn side_text(rendered: &str) -> String {
    let text = PARAGRAPH.replace_all(rendered, "").replace("&nbsp;", " ");
    let text = TRAILING_BRACKET.replace(&text, "");
    TRAILING_ANCHOR.replace(&text, "").trim().to_string()
}

/// The last `[...]` phonetic hint of a rendered side.
fn pronunciation(rendered: &str) -> String {
    if !rendered.contains('[') {
        return String::new();
    }
    let plain = HTML_TAG.replace_all(rendered, "");
    let plain = BEFORE_BRACKET.replace(&plain, "[");
    AFTER_BRACKET.replace(&plain, "]").trim().to_string()
}

/// Upload an image and return its markup, or nothing when the upload fails.
async fn embed_image(
    media: &dyn MediaService,
    file: Option<String>,
    card: &str,
    warnings: &mut Vec<Warning>,
) -> Option<String> {
    let file = file?;
    match media.upload(&file).await {
        Ok(()) => Some(format!("<img src=\"{file}\">")),
        Err(error) => {
            raise(
                warnings,
                Warning::MediaFailure {
                    card: card.to_string(),
                    message: format!("upload of {file}: {error}"),
                },
            );
            None
        }
    }
}

/// Synthesize speech and return its sound token.
async fn speak(
    media: &dyn MediaService,
    request: &SpeechRequest,
    card: &str,
    warnings: &mut Vec<Warning>,
) -> Option<String> {
    match media.synthesize(request).await {
        Ok(file) => file.map(|file| format!("[sound:{file}]")),
        Err(error) => {
            raise(
                warnings,
                Warning::MediaFailure {
                    card: card.to_string(),
                    message: error.to_string(),
                },
            );
            None
        }
    }
}

fn unrecognized_deck(warnings: &mut Vec<Warning>, card: &str, deck: &str) {
    raise(
        warnings,
        Warning::UnrecognizedDeckPattern {
            card: card.to_string(),
            deck: deck.to_string(),
        },
    );
}

async fn build_card(
    ctx: &BuildContext<'_>,
    media_service: &dyn MediaService,
    speech: &dyn SpeechPolicy,
    candidate: Candidate,
    warnings: &mut Vec<Warning>,
) -> InlineCard {
    let card = candidate.question.as_str();
    let (answer, entries) = metadata::split_tail(&candidate.answer);
    let metadata = metadata::parse(&entries, card, Accepts::INLINE, warnings);
    let deck = ctx.deck_or(metadata.deck);

    let context = ctx.context(candidate.span.start, candidate.heading_level);
    let question = ctx.assemble(&context, card);
    let media_files = media(&[&question, &answer], &[&answer]);

    let hint_file = HINT_IMAGE.captures(&answer).map(|caps| caps[1].to_string());
    let front_file = PICTURE_IMAGE.captures(&question).map(|caps| caps[1].to_string());
    let back_file = PICTURE_IMAGE.captures(&answer).map(|caps| caps[1].to_string());
    let hint_image = embed_image(media_service, hint_file, card, warnings).await;
    let front_image = embed_image(media_service, front_file, card, warnings).await;
    let back_image = embed_image(media_service, back_file, card, warnings).await;

    let rendered_question = ctx.render(&question);
    let rendered_answer = ctx.render(&answer);
    let front = side_text(&rendered_question);
    let back = side_text(&rendered_answer);

    let mut front_sound = None;
    let mut back_sound = None;
    let sides = speech.sides(&deck);
    if sides.front || sides.back {
        let languages = LANGUAGE_PAIR
            .captures(&deck)
            .map(|caps| (caps[1].to_lowercase(), caps[2].to_lowercase()));
        match languages {
            Some((front_lang, back_lang)) => {
                if sides.front {
                    let request = SpeechRequest::new(front_lang, &front);
                    front_sound = speak(media_service, &request, card, warnings).await;
                }
                if sides.back {
                    let request = SpeechRequest::new(back_lang, &back);
                    back_sound = speak(media_service, &request, card, warnings).await;
                }
            }
            None => unrecognized_deck(warnings, card, &deck),
        }
    }

    let mut fields = Fields::new();
    fields.insert("Front", front);
    fields.insert("FrontPronunciation", pronunciation(&rendered_question));
    fields.insert("Back", back);
    fields.insert("BackPronunciation", pronunciation(&rendered_answer));
    ctx.add_source(&mut fields);
    let optional = [
        ("FrontSound", front_sound),
        ("BackSound", back_sound),
        ("Hint", metadata.hint),
        ("HintImage", hint_image),
        ("FrontImage", front_image),
        ("BackImage", back_image),
    ];
    for (name, value) in optional {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            fields.insert(name, value);
        }
    }

    let mut data = card_data(
        deck,
        card,
        fields,
        candidate.span,
        candidate.tags,
        candidate.id,
        media_files,
    );
    data.reversed = candidate.reversed;
    InlineCard {
        data,
        options: metadata.options,
    }
}

/// Give every card asking for sentences the note's sentence cards, with a
/// combined recording when the deck names its languages.
async fn add_sentences(
    cards: &mut [InlineCard],
    media_service: &dyn MediaService,
    warnings: &mut Vec<Warning>,
) {
    if !cards.iter().any(|card| card.options.add_sentences) {
        return;
    }

    let plain = |card: &InlineCard, field: &str| {
        let value = card.data.fields.get(field).unwrap_or_default();
        SENTENCE_MARKUP.replace_all(value, "").trim().to_string()
    };
    let sentences: Vec<SentencePair> = cards
        .iter()
        .filter(|card| SENTENCE_DECK.is_match(&card.data.deck))
        .map(|card| SentencePair {
            front: plain(card, "Front"),
            back: plain(card, "Back"),
        })
        .collect();
    let listing: String = sentences
        .iter()
        .map(|pair| format!("{} - {}<br/>", pair.front, pair.back))
        .collect();

    for card in cards.iter_mut().filter(|card| card.options.add_sentences) {
        card.data
            .fields
            .insert("Sentences", format!("<p>{listing}</p>"));
        if sentences.is_empty() {
            continue;
        }

        let Some(lang) = LANGUAGE_PAIR
            .captures(&card.data.deck)
            .map(|caps| caps[2].to_lowercase())
        else {
            unrecognized_deck(warnings, &card.data.original_text, &card.data.deck);
            continue;
        };
        let request = SpeechRequest {
            lang,
            text: card.data.fields.get("Front").unwrap_or_default().to_string(),
            sentences: sentences.clone(),
        };
        let spoken = speak(media_service, &request, &card.data.original_text, warnings).await;
        if let Some(sound) = spoken {
            card.data.fields.insert("SentencesSound", sound);
        }
    }
}

pub(crate) async fn build(
    ctx: &BuildContext<'_>,
    media_service: &dyn MediaService,
    speech: &dyn SpeechPolicy,
    warnings: &mut Vec<Warning>,
) -> Vec<Card> {
    let mut cards = Vec::new();
    for candidate in candidates(ctx) {
        cards.push(build_card(ctx, media_service, speech, candidate, warnings).await);
    }
    add_sentences(&mut cards, media_service, warnings).await;
    cards.into_iter().map(Card::Inline).collect()
}
