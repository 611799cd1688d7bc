//! Markdown to HTML conversion.

use std::sync::LazyLock;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).unwrap());

/// Converts card text from markdown to HTML.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// GitHub-flavoured rendering on pulldown-cmark.
///
/// Tables, task lists and strikethrough are enabled, bare URLs become
/// links and single newlines become line breaks.
#[derive(Debug, Default, Clone, Copy)]
pub struct PulldownRenderer;

impl PulldownRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MarkdownRenderer for PulldownRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let mut events: Vec<Event<'_>> = Vec::new();
        let mut link_depth = 0usize;
        let mut in_code_block = false;

        for event in TextMergeStream::new(Parser::new_ext(markdown, options)) {
            match event {
                Event::Start(Tag::Link { .. }) => {
                    link_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::InlineHtml(raw) if raw.starts_with("<a ") => {
                    link_depth += 1;
                    events.push(Event::InlineHtml(raw));
                }
                Event::InlineHtml(raw) if raw.starts_with("</a") => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(Event::InlineHtml(raw));
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code_block = true;
                    events.push(event);
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    events.push(event);
                }
                Event::SoftBreak => events.push(Event::HardBreak),
                Event::Text(text) if link_depth == 0 && !in_code_block => {
                    push_autolinked(&text, &mut events);
                }
                other => events.push(other),
            }
        }

        let mut output = String::new();
        html::push_html(&mut output, events.into_iter());
        output.trim_end().to_string()
    }
}

/// Splits text around bare URLs, turning each URL into an anchor.
fn push_autolinked(text: &str, events: &mut Vec<Event<'_>>) {
    let mut last = 0;
    for found in BARE_URL.find_iter(text) {
        let url = found
            .as_str()
            .trim_end_matches(|c| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')'));
        let end = found.start() + url.len();
        if found.start() > last {
            events.push(Event::Text(CowStr::from(text[last..found.start()].to_string())));
        }
        events.push(Event::InlineHtml(CowStr::from(format!(
            "<a href=\"{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(url),
            html_escape::encode_text(url)
        ))));
        last = end;
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}
