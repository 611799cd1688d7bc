//! Whole-note structural scan.
//!
//! One pass over the note collects headings, fenced code blocks and math
//! spans. Builders, the context resolver and the overlap filter all read
//! this index instead of re-scanning the note.

use std::ops::Range;

use regex::Regex;

use crate::patterns::{CODE_FENCE, HEADING, MATH_BLOCK, MATH_INLINE};
use crate::types::Heading;

/// Structural spans of one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanIndex {
    pub headings: Vec<Heading>,
    pub code_blocks: Vec<Range<usize>>,
    pub math_blocks: Vec<Range<usize>>,
    pub math_inline: Vec<Range<usize>>,
}

impl SpanIndex {
    /// Scan a note. Headings are only collected when `with_headings` is
    /// set, since only context-aware extraction reads them.
    pub fn build(text: &str, with_headings: bool) -> Self {
        let code_blocks = ranges(&CODE_FENCE, text);
        let headings = if with_headings {
            HEADING
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    if contained_in(&code_blocks, &whole.range()) {
                        return None;
                    }
                    Some(Heading {
                        level: caps[1].len(),
                        text: caps[2].trim().to_string(),
                        offset: whole.start(),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            headings,
            code_blocks,
            math_blocks: ranges(&MATH_BLOCK, text),
            math_inline: ranges(&MATH_INLINE, text),
        }
    }

    /// Whether `span` lies wholly inside a math block or inline math span.
    pub fn in_math(&self, span: &Range<usize>) -> bool {
        contained_in(&self.math_blocks, span) || contained_in(&self.math_inline, span)
    }

    /// Whether `span` lies wholly inside code or math.
    pub fn in_literal(&self, span: &Range<usize>) -> bool {
        contained_in(&self.code_blocks, span) || self.in_math(span)
    }
}

fn ranges(pattern: &Regex, text: &str) -> Vec<Range<usize>> {
    pattern.find_iter(text).map(|m| m.range()).collect()
}

/// Containment, not overlap: a span straddling a boundary is outside.
pub(crate) fn contained_in(ranges: &[Range<usize>], span: &Range<usize>) -> bool {
    ranges
        .iter()
        .any(|range| span.start >= range.start && span.end <= range.end)
}
