mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use vaultcards_core::{
    inject_ids, silent, Card, Extractor, MarkdownRenderer, Normalizer, Note, PulldownRenderer,
    Settings, SpeechRequest, Warning, NEW_CARD_ID,
};

use common::{extract, extractor, RecordingMedia};

#[tokio::test]
async fn every_span_lies_within_the_note() {
    let text = "# Title\n\
                Q #card\nA\n\n\
                Hola :: Hello\n\
                Recall #card/spaced\n\
                The {answer} is ==here==\n\
                ```\ncode :: block\n```\n";
    let extraction = extract(text).await;
    assert_eq!(extraction.cards.len(), 4);
    for card in &extraction.cards {
        let span = card.span();
        assert!(span.start < span.end, "{span:?}");
        assert!(span.end <= text.len(), "{span:?}");
    }
}

#[tokio::test]
async fn card_inside_code_block_is_discarded() {
    let text = "```\nQuestion #card\nAnswer\n```\n";
    assert!(extract(text).await.cards.is_empty());
}

#[tokio::test]
async fn card_straddling_code_block_is_kept() {
    let text = "```\nQuestion #card\n```\nAnswer\n";
    let extraction = extract(text).await;
    assert_eq!(extraction.cards.len(), 1);
    assert_eq!(extraction.cards[0].type_name(), "tag");
}

#[tokio::test]
async fn context_chain_prefixes_the_question() {
    let text = "# A\n\n## B\n\nQuestion #card\nAnswer\n";
    let extraction = extract(text).await;
    assert_eq!(
        extraction.cards[0].fields().get("Front"),
        Some("<p>A &gt; B &gt; Question</p>")
    );
}

#[tokio::test]
async fn cloze_tokens_are_converted() {
    let extraction = extract("{c2::x} and {y}\n\nOnly $\\frac{1}{2}$ here\n").await;
    assert_eq!(extraction.cards.len(), 1);
    assert_eq!(
        extraction.cards[0].fields().get("Text"),
        Some("<p>{{c2::x}} and {{c1::y}}</p>")
    );
}

#[tokio::test]
async fn identifier_markers_are_recovered() {
    let extraction = extract("Hola :: Hello ^1234567890123\nAdios :: Bye\n").await;
    let ids: Vec<(i64, bool)> = extraction
        .cards
        .iter()
        .map(|card| (card.data().id, card.data().inserted))
        .collect();
    assert_eq!(ids, vec![(1234567890123, true), (NEW_CARD_ID, false)]);
}

#[tokio::test]
async fn tag_hierarchy_uses_double_colons() {
    let extraction = extract("Q #card #parent\\child\nA\n").await;
    assert!(extraction.cards[0]
        .data()
        .tags
        .contains(&"parent::child".to_string()));
}

#[tokio::test]
async fn inline_card_under_heading() {
    let extraction = extract("# Lang\nHello :: Cześć #card\n").await;
    assert_eq!(extraction.cards.len(), 1);
    let Card::Inline(card) = &extraction.cards[0] else {
        panic!("expected an inline card, got {:?}", extraction.cards[0]);
    };
    assert!(card.data.fields.get("Front").unwrap().contains("Lang"));
    assert_eq!(card.data.fields.get("Back"), Some("Cześć"));
    assert!(!card.data.reversed);
    assert!(card.data.tags.contains(&"card".to_string()));
}

#[tokio::test]
async fn cloze_with_identifier() {
    let extraction = extract("Paris is the capital of {France} ^1111111111111").await;
    assert_eq!(extraction.cards.len(), 1);
    let Card::Cloze(card) = &extraction.cards[0] else {
        panic!("expected a cloze card");
    };
    assert_eq!(card.data.id, 1111111111111);
    assert!(card.data.inserted);
    assert!(card
        .data
        .fields
        .get("Text")
        .unwrap()
        .contains("{{c1::France}}"));
}

#[test]
fn rendering_is_idempotent() {
    let normalizer = Normalizer::new(Arc::new(PulldownRenderer::new()));
    let once = normalizer.render_line("Area $\\pi r^2$ and $$e^{i\\pi}$$", "Vault");
    assert_eq!(normalizer.render_line(&once, "Vault"), once);
}

#[tokio::test]
async fn malformed_metadata_keeps_the_card() {
    let extraction = extract("Hola :: Hello || deck || hint: greeting\n").await;
    assert_eq!(extraction.cards.len(), 1);
    assert_eq!(extraction.cards[0].fields().get("Hint"), Some("greeting"));
    assert!(extraction
        .warnings
        .iter()
        .any(|warning| matches!(warning, Warning::MalformedMetadata { .. })));
}

#[tokio::test]
async fn speech_requests_follow_card_order() {
    let media = Arc::new(RecordingMedia::default());
    let extractor = extractor().with_media(media.clone());
    let note = Note::new("uno :: one\ndos :: two\n", "ES-EN");
    let extraction = extractor.extract(&note).await;

    assert_eq!(extraction.cards.len(), 2);
    assert_eq!(
        media.requests(),
        vec![SpeechRequest::new("es", "uno"), SpeechRequest::new("es", "dos")]
    );
    assert_eq!(
        extraction.cards[1].fields().get("FrontSound"),
        Some("[sound:es-2.mp3]")
    );
}

#[tokio::test]
async fn silent_policy_makes_no_requests() {
    let media = Arc::new(RecordingMedia::default());
    let extractor = extractor()
        .with_media(media.clone())
        .with_speech_policy(Arc::new(silent));
    let extraction = extractor.extract(&Note::new("uno :: one\n", "Default")).await;
    assert!(media.requests().is_empty());
    assert!(extraction.warnings.is_empty());
}

#[tokio::test]
async fn custom_renderer_is_used() {
    struct Upper;
    impl MarkdownRenderer for Upper {
        fn render(&self, markdown: &str) -> String {
            markdown.to_uppercase()
        }
    }

    let extractor = extractor().with_renderer(Arc::new(Upper));
    let extraction = extractor.extract(&Note::new("Q #card\nanswer\n", "Default")).await;
    assert_eq!(extraction.cards[0].fields().get("Back"), Some("ANSWER"));
}

#[tokio::test]
async fn injected_ids_are_recovered_on_the_next_pass() {
    let text = "Hola :: Hello\n\nQ #card\nA\n\nThe {capital} of Spain\n\nRecall #card/spaced\n";
    let first = extract(text).await;
    assert_eq!(first.cards.len(), 4);

    let assignments: Vec<(&Card, i64)> = first
        .cards
        .iter()
        .zip(1_700_000_000_001_i64..)
        .collect();
    let updated = inject_ids(text, &assignments);

    let second = extract(&updated).await;
    let ids: Vec<i64> = second.cards.iter().map(|card| card.data().id).collect();
    assert_eq!(
        ids,
        vec![1_700_000_000_001, 1_700_000_000_002, 1_700_000_000_003, 1_700_000_000_004]
    );
    assert!(extractor().find_deletion_candidates(&updated).is_empty());
    assert_eq!(extractor().find_existing_ids(&updated).len(), 4);
}

#[tokio::test]
async fn custom_tag_and_separators() {
    let settings = Settings {
        flashcards_tag: "flashcard".to_string(),
        inline_separator: "->".to_string(),
        inline_separator_reverse: "<->".to_string(),
        context_aware_mode: false,
        ..Settings::default()
    };
    let extractor = Extractor::new(settings).unwrap();
    let note = Note::new("# H\n\nQ #flashcard\nA\n\nsol <-> sun\n", "Default");
    let extraction = extractor.extract(&note).await;
    assert_eq!(extraction.cards.len(), 2);
    assert_eq!(extraction.cards[0].fields().get("Front"), Some("<p>Q</p>"));
    assert!(extraction.cards[1].data().reversed);
}

#[tokio::test]
async fn tagged_inline_lines_make_inline_cards_only() {
    let extraction = extract("Hello :: Cześć #card\nBye :: Pa #card\n").await;
    let kinds: Vec<&str> = extraction.cards.iter().map(Card::type_name).collect();
    assert_eq!(kinds, vec!["inline", "inline"]);
    assert_eq!(extraction.cards[1].fields().get("Back"), Some("Pa"));
}

#[tokio::test]
async fn marker_below_an_inline_answer_belongs_to_the_tag_card() {
    let extraction = extract("Q #card\nfoo :: bar\n^1111111111111\n").await;
    let id_of = |kind: &str| {
        extraction
            .cards
            .iter()
            .find(|card| card.type_name() == kind)
            .map(|card| card.data().id)
    };
    assert_eq!(id_of("tag"), Some(1111111111111));
    assert_eq!(id_of("inline"), Some(NEW_CARD_ID));
}
