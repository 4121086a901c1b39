/*!
 * Code-fence aware segmentation of document text.
 *
 * A document is split into `CodeBlock` segments (everything between a pair
 * of triple-backtick fences, fences included) and `Prose` segments (the
 * rest). Segments partition the input: concatenating their text in order
 * reproduces the document exactly.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for a fenced code block, non-greedy across lines
static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```.*?```").expect("Invalid code fence regex")
});

/// Classification of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Text between matching fences, passed through verbatim
    CodeBlock,
    /// Everything else, subject to rewrite rules
    Prose,
}

/// A contiguous slice of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

impl<'a> Segment<'a> {
    pub fn is_prose(&self) -> bool {
        self.kind == SegmentKind::Prose
    }
}

/// Split `text` into code block and prose segments.
///
/// An unterminated fence has no closing match, so it stays inside the
/// trailing prose segment. Empty prose gaps between adjacent code blocks
/// are not emitted.
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for fence in CODE_FENCE_REGEX.find_iter(text) {
        if fence.start() > cursor {
            segments.push(Segment {
                kind: SegmentKind::Prose,
                text: &text[cursor..fence.start()],
            });
        }
        segments.push(Segment {
            kind: SegmentKind::CodeBlock,
            text: fence.as_str(),
        });
        cursor = fence.end();
    }

    if cursor < text.len() {
        segments.push(Segment {
            kind: SegmentKind::Prose,
            text: &text[cursor..],
        });
    }

    segments
}
