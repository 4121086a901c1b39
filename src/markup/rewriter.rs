/*!
 * Link and embed rewriting for vault documents.
 *
 * Turns note-application markup into portable Markdown that a generic
 * renderer understands. Rules only run on prose segments; fenced code is
 * copied through untouched. The rules run in a fixed order because the
 * video rule must see `![alt](url)` before it is treated as an image, and
 * media embeds must be gone before plain wiki links are matched.
 */

use std::borrow::Cow;

use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

use super::segments::segment;
use super::video::{VIDEO_PLACEHOLDER_PREFIX, VideoReference};

/// Characters escaped in link targets; `/` is kept so folders survive
const LINK_TARGET_ESCAPES: &AsciiSet = &CONTROLS.add(b' ').add(b'(').add(b')').add(b'%');

/// `![alt](url)` where url is a YouTube watch or short link
static VIDEO_EMBED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"!\[([^\]]*)\]\((https?://(?:(?:(?:www|m)\.)?youtube\.com/watch\?(?:[^)\s]*&)?v=[^)\s]+|youtu\.be/[^)\s]+))\)",
    )
    .expect("Invalid video embed regex")
});

/// `![[inner]]`
static MEDIA_EMBED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[\[(.*?)\]\]").expect("Invalid media embed regex")
});

/// `[[inner]]`, the `!` prefix is checked by the caller
static WIKI_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[(.*?)\]\]").expect("Invalid wiki link regex")
});

/// `==text==` with non-empty text that neither starts nor ends with `=`
static HIGHLIGHT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"==([^=\n](?:[^\n]*?[^=\n])?)==").expect("Invalid highlight regex")
});

/// Output of a single rewrite pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteResult {
    /// Rewritten document text
    pub text: String,
    /// Videos pulled out of the text, in document order
    pub video_references: Vec<VideoReference>,
}

/// Per-call state: the placeholder counter and what it produced
#[derive(Debug, Default)]
struct RewriteState {
    next_placeholder: usize,
    video_references: Vec<VideoReference>,
}

impl RewriteState {
    fn allocate_placeholder(&mut self) -> String {
        let placeholder = format!("{}{}", VIDEO_PLACEHOLDER_PREFIX, self.next_placeholder);
        self.next_placeholder += 1;
        placeholder
    }
}

/// Rewrite a whole document.
///
/// Deterministic and total: text outside matched spans is copied as is,
/// and placeholder numbering starts at 0 for every call.
pub fn rewrite(document_text: &str) -> RewriteResult {
    let mut state = RewriteState::default();
    let mut text = String::with_capacity(document_text.len());

    for part in segment(document_text) {
        if part.is_prose() {
            text.push_str(&rewrite_prose(part.text, &mut state));
        } else {
            text.push_str(part.text);
        }
    }

    RewriteResult {
        text,
        video_references: state.video_references,
    }
}

fn rewrite_prose(prose: &str, state: &mut RewriteState) -> String {
    let text = extract_video_embeds(prose, state);
    let text = rewrite_media_embeds(&text);
    let text = rewrite_wiki_links(&text);
    rewrite_highlights(&text).into_owned()
}

// Rule 1
fn extract_video_embeds<'t>(text: &'t str, state: &mut RewriteState) -> Cow<'t, str> {
    VIDEO_EMBED_REGEX.replace_all(text, |caps: &Captures| {
        let alt_text = caps[1].to_string();
        let url = caps[2].to_string();
        let placeholder_id = state.allocate_placeholder();
        let link = format!("[{}]({})", placeholder_id, url);
        state.video_references.push(VideoReference {
            placeholder_id,
            url,
            alt_text,
        });
        link
    })
}

// Rule 2
fn rewrite_media_embeds(text: &str) -> Cow<'_, str> {
    MEDIA_EMBED_REGEX.replace_all(text, |caps: &Captures| {
        let inner = &caps[1];
        match split_width(inner) {
            (path, Some(width)) => format!("![]({}){{ width={}px }}", encode_target(path), width),
            (path, None) => format!("![]({})", encode_target(path)),
        }
    })
}

// Rule 3
fn rewrite_wiki_links(text: &str) -> Cow<'_, str> {
    let mut output = String::new();
    let mut cursor = 0;

    for caps in WIKI_LINK_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if text[..whole.start()].ends_with('!') {
            continue;
        }
        let Some(link) = wiki_link_markdown(&caps[1]) else { continue };
        output.push_str(&text[cursor..whole.start()]);
        output.push_str(&link);
        cursor = whole.end();
    }

    if cursor == 0 {
        return Cow::Borrowed(text);
    }
    output.push_str(&text[cursor..]);
    Cow::Owned(output)
}

// Rule 4
fn rewrite_highlights(text: &str) -> Cow<'_, str> {
    HIGHLIGHT_REGEX.replace_all(text, r#"<span class="highlight">$1</span>"#)
}

/// Split a trailing `|<digits>` width off a media embed.
/// Anything else after the last `|` is part of the path.
fn split_width(inner: &str) -> (&str, Option<&str>) {
    match inner.rsplit_once('|') {
        Some((path, width)) if !width.is_empty() && width.bytes().all(|b| b.is_ascii_digit()) => {
            (path, Some(width))
        }
        _ => (inner, None),
    }
}

/// Build the Markdown link for the inside of a `[[...]]`.
/// Returns `None` when there is nothing to link to.
fn wiki_link_markdown(inner: &str) -> Option<String> {
    let (target, title) = match inner.split_once('|') {
        Some((target, title)) => (target, Some(title)),
        None => (inner, None),
    };
    let (document, heading) = match target.split_once('#') {
        Some((document, heading)) => (document, Some(heading)),
        None => (target, None),
    };

    let document = document.trim();
    let fragment = heading
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(heading_identifier);

    let href = match (document.is_empty(), fragment) {
        (true, None) => return None,
        (true, Some(fragment)) => format!("#{}", fragment),
        (false, fragment) => {
            let mut href = format!("{}.html", encode_target(strip_markdown_extension(document)));
            if let Some(fragment) = fragment {
                href.push('#');
                href.push_str(&fragment);
            }
            href
        }
    };

    let text = title.unwrap_or(target);
    Some(format!("[{}]({})", text, href))
}

fn strip_markdown_extension(document: &str) -> &str {
    let split = document.len().saturating_sub(3);
    match (document.get(..split), document.get(split..)) {
        (Some(stem), Some(ext)) if !stem.is_empty() && ext.eq_ignore_ascii_case(".md") => stem,
        _ => document,
    }
}

fn encode_target(target: &str) -> String {
    utf8_percent_encode(target, LINK_TARGET_ESCAPES).to_string()
}

/// Heading text to the identifier pandoc generates for it
pub fn heading_identifier(heading: &str) -> String {
    let mut identifier = String::with_capacity(heading.len());
    let mut seen_letter = false;

    for c in heading.chars() {
        if !seen_letter {
            if !c.is_alphabetic() {
                continue;
            }
            seen_letter = true;
        }
        if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
            identifier.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            identifier.push('-');
        }
    }

    if identifier.is_empty() {
        "section".to_string()
    } else {
        identifier
    }
}
