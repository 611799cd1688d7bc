//! Media and link normalization of card text.
//!
//! Raw note syntax (wiki links, embeds, `$` math) is rewritten into markup
//! the card store understands, then rendered to HTML. Media references
//! have to be collected before rewriting, since rewriting destroys the
//! link syntax they are read from.

use std::sync::Arc;

use crate::markdown::MarkdownRenderer;
use crate::patterns::{MARKDOWN_IMAGE, MATH_BLOCK, MATH_INLINE, NOTE_LINK, WIKI_AUDIO, WIKI_IMAGE};

/// Image file names referenced by wiki or markdown image links, in the
/// order they appear.
pub fn extract_image_links(text: &str) -> Vec<String> {
    let wiki = WIKI_IMAGE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str().to_string()));
    let markdown = MARKDOWN_IMAGE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let name = urlencoding::decode(m.as_str())
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| m.as_str().to_string());
            (m.start(), name)
        });

    let mut links: Vec<(usize, String)> = wiki.chain(markdown).collect();
    links.sort_by_key(|(offset, _)| *offset);
    links.into_iter().map(|(_, name)| name).collect()
}

/// Audio file names referenced by wiki embeds.
pub fn extract_audio_links(text: &str) -> Vec<String> {
    WIKI_AUDIO
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Rewrite `[[target|alias]]` into a link that opens `target` in `vault`.
pub fn rewrite_note_links(text: &str, vault: &str) -> String {
    let vault = urlencoding::encode(vault);
    NOTE_LINK
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let target = &caps[1];
            let display = caps.get(2).map_or(target, |alias| alias.as_str());
            format!(
                "<a href=\"obsidian://open?vault={}&amp;file={}.md\">{}</a>",
                vault,
                urlencoding::encode(target),
                display
            )
        })
        .into_owned()
}

/// Rewrite image embeds into `<img>` tags and audio embeds into sound tokens.
pub fn rewrite_media_links(text: &str) -> String {
    let text = WIKI_AUDIO.replace_all(text, "[sound:$1]");
    let text = WIKI_IMAGE.replace_all(&text, "<img src='$1'>");
    MARKDOWN_IMAGE
        .replace_all(&text, "<img src='$1'>")
        .into_owned()
}

/// Rewrite `$$…$$` and `$…$` into `\[…\]` and `\(…\)`.
///
/// The payload is escaped, and the delimiters carry a doubled backslash,
/// so both survive the markdown pass intact.
pub fn rewrite_math(text: &str) -> String {
    let text = MATH_BLOCK.replace_all(text, |caps: &regex::Captures<'_>| {
        format!(r"\\[{} \\]", escape_markdown(&caps[1]))
    });
    MATH_INLINE
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            format!(r"\\({}\\)", escape_markdown(&caps[1]))
        })
        .into_owned()
}

fn escape_markdown(payload: &str) -> String {
    let mut escaped = String::with_capacity(payload.len());
    for c in payload.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '~' | '|') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Applies the rewrites in a fixed order and renders the result.
#[derive(Clone)]
pub struct Normalizer {
    renderer: Arc<dyn MarkdownRenderer>,
}

impl Normalizer {
    pub fn new(renderer: Arc<dyn MarkdownRenderer>) -> Self {
        Self { renderer }
    }

    /// Media links, then note links, then math, then markdown.
    pub fn render_line(&self, text: &str, vault: &str) -> String {
        let text = rewrite_media_links(text);
        let text = rewrite_note_links(&text, vault);
        let text = rewrite_math(&text);
        self.renderer.render(&text)
    }
}
