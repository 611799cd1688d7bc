//! Pattern catalog: the regexes that recognise card syntaxes and note
//! structure.
//!
//! Structural patterns are fixed and compiled once per process. Card
//! patterns depend on the configured tag and separators, so they are
//! compiled per [`Settings`] by [`CardPatterns::new`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::settings::Settings;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg", "tiff"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "webm", "wav", "m4a", "ogg", "3gp", "flac"];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// `# Heading` lines: level run, text, trailing heading tags.
pub(crate) static HEADING: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^ {0,3}(#{1,6}) +([^\n]+?) ?((?: *#\S+)*) *$"));

/// Fenced code blocks, including the newline that closes the fence.
pub(crate) static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?ms)```.*?```(?:\n|$)"));

/// Rendered code, used to flag cards that contain code.
pub(crate) static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<code\b[^>]*>(.*?)</code>"));

pub(crate) static MATH_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?s)\$\$(.*?)\$\$"));

pub(crate) static MATH_INLINE: LazyLock<Regex> = LazyLock::new(|| compile(r"\$(.*?)\$"));

pub(crate) static WIKI_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)!\[\[([^\]|]+\.(?:{}))(?:\|[^\]]*)?\]\]",
        IMAGE_EXTENSIONS.join("|")
    ))
});

pub(crate) static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)!\[[^\]]*\]\(([^)\s]+\.(?:{}))[^)]*\)",
        IMAGE_EXTENSIONS.join("|")
    ))
});

pub(crate) static WIKI_AUDIO: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)!\[\[([^\]|]+\.(?:{}))(?:\|[^\]]*)?\]\]",
        AUDIO_EXTENSIONS.join("|")
    ))
});

/// `[[target]]` and `[[target|alias]]`.
pub(crate) static NOTE_LINK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\[\[(.+?)(?:\|(.+?))?\]\]"));

/// `![[target]]`; media targets are filtered out with [`is_media_file`].
pub(crate) static EMBED: LazyLock<Regex> = LazyLock::new(|| compile(r"!\[\[(.*?)\]\]"));

/// Every identifier marker, for reconciliation.
pub(crate) static ID_MARKER: LazyLock<Regex> = LazyLock::new(|| compile(r"\^(\d{13})\s*"));

/// An identifier marker with no card content above it.
pub(crate) static ORPHAN_ID: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^\s*\n\^(\d{13})(?:\n\s*?)?"));

/// An identifier marker inside a line of answer text.
pub(crate) static LINE_ID: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[ \t]*\^(\d{13})"));

/// `{text}`, `{2:text}`, `{c2::text}` inside a cloze line.
pub(crate) static CLOZE_CURLY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\{(?:c?(\d+)::?)?(.+?)\}"));

pub(crate) static CLOZE_HIGHLIGHT: LazyLock<Regex> = LazyLock::new(|| compile(r"==(.+?)=="));

/// Image attached to the hint side of an inline card: `[[file|Hint]]`.
pub(crate) static HINT_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\[\[([^\[]+?)\|Hint\]\]"));

/// Image attached to the front or back of an inline card: `[[file|🖼]]`.
pub(crate) static PICTURE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\[\[([^\[]+?)\|🖼\]\]"));

/// Any HTML tag, for stripping markup out of plain-text values.
pub(crate) static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"<.+?>"));

/// `lang1-lang2[-suffix]` deck names.
pub(crate) static LANGUAGE_PAIR: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(.+?)-(.+?)(-.+)?$"));

pub(crate) static SENTENCE_DECK: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)sentences"));

pub(crate) static DECK_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?im)^[ \t]*cards-deck:[ \t]*(.+?)[ \t]*$"));

pub(crate) static TAGS_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?im)^[ \t]*(?:cards-)?tags:[ \t]*(.*)$"));

/// Splits a tags declaration into `[[link]]`, `#tag` or bare-word tags.
pub(crate) static GLOBAL_TAG: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\[\[(.*?)\]\]|#([\p{L}\d:\-_/\\]+)|([\p{L}\d:\-_/\\]+)")
});

/// Whether a link target names an image or audio file.
pub fn is_media_file(target: &str) -> bool {
    let lower = target.to_lowercase();
    match lower.rsplit_once('.') {
        Some((_, extension)) => {
            IMAGE_EXTENSIONS.contains(&extension) || AUDIO_EXTENSIONS.contains(&extension)
        }
        None => false,
    }
}

/// Card patterns compiled from settings.
#[derive(Debug, Clone)]
pub struct CardPatterns {
    /// Question lines ending in the flashcards tag. Groups: heading run,
    /// question, tag, per-card tags. The answer is read line by line
    /// after the match.
    pub tag: Regex,
    /// Groups: heading run, prompt, tag, per-card tags, id.
    pub spaced: Regex,
    /// Groups: heading run, question, separator, answer, per-card tags, id.
    pub inline: Regex,
    /// Groups: heading run, line, first cloze token, per-card tags, id.
    pub cloze: Regex,
    reverse_tags: [String; 2],
    reverse_separator: String,
}

impl CardPatterns {
    pub fn new(settings: &Settings) -> Result<Self> {
        let tag = regex::escape(settings.flashcards_tag.trim());

        let tag_pattern = Regex::new(&format!(
            r"(?i)( {{0,3}}#*)((?:[^\n]\n?)+?)(#{tag}(?:[/-]reverse)?)((?: *#[\p{{N}}\p{{L}}\-/_\\]+)*) *?(?:\r?\n)+"
        ))?;

        let spaced_pattern = Regex::new(&format!(
            r"(?i)( {{0,3}}#*)((?:[^\n]\n?)+?)(#{tag}[/-]spaced)((?: *#[\p{{L}}\-/_\\]+)*) *\n?(?:\^(\d{{13}}))?"
        ))?;

        // The longer separator goes first so `:::` is not read as `::`.
        let (forward, reverse) = (
            settings.inline_separator.as_str(),
            settings.inline_separator_reverse.as_str(),
        );
        let (longest, shortest) = if forward.len() >= reverse.len() {
            (forward, reverse)
        } else {
            (reverse, forward)
        };
        let inline_pattern = Regex::new(&format!(
            r"(?im)( {{0,3}}#{{0,6}})?(?:[\t ]*(?:\d\.|[-+*]|#{{1,6}}))?(.+?) ?({}|{}) ?(.+?)((?: *#[\p{{L}}\-/_\\]+)+)?(?:[ \t]+\^(\d{{13}})|$)",
            regex::escape(longest),
            regex::escape(shortest),
        ))?;

        let cloze_pattern = Regex::new(
            r"(?im)( {0,3}#{0,6})?(?:[\t ]*(?:\d\.|[-+*]|#{1,6}))?(.*?(==.+?==|\{.+?\}).*?)((?: *#[\w\-/_\\]+)+)?(?:(?:[ \t]+|\n)\^(\d{13}))?[ \t]*$",
        )?;

        let lower_tag = settings.flashcards_tag.trim().to_lowercase();
        Ok(Self {
            tag: tag_pattern,
            spaced: spaced_pattern,
            inline: inline_pattern,
            cloze: cloze_pattern,
            reverse_tags: [
                format!("#{lower_tag}-reverse"),
                format!("#{lower_tag}/reverse"),
            ],
            reverse_separator: reverse.to_string(),
        })
    }

    /// Whether a matched flashcards tag asks for a reversed card.
    pub fn is_reverse_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.reverse_tags.iter().any(|reverse| *reverse == tag)
    }

    /// Whether a matched inline separator is the reverse separator.
    pub fn is_reverse_separator(&self, separator: &str) -> bool {
        separator == self.reverse_separator
    }
}
