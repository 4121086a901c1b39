/*!
 * Video embed resolution and post-render substitution.
 *
 * The rewriter replaces video embeds with ordinary links whose text is a
 * placeholder token. Once the renderer has produced HTML, each
 * `<a href="URL">PLACEHOLDER</a>` is swapped for an inline player.
 */

use log::debug;
use url::Url;

/// Prefix of every placeholder token produced by the rewriter
pub const VIDEO_PLACEHOLDER_PREFIX: &str = "VIDEOPLACEHOLDER_";

const EMBED_WIDTH: u32 = 560;
const EMBED_HEIGHT: u32 = 315;

/// A video embed pulled out of a document during rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    /// Token the link text was replaced with
    pub placeholder_id: String,
    /// Original video URL
    pub url: String,
    /// Alt text of the original embed
    pub alt_text: String,
}

/// Derive the inline player markup for a video URL.
///
/// Accepts `youtube.com/watch?v=ID` (optionally `www.` or `m.`) and
/// `youtu.be/ID`. Returns `None` for anything else, including IDs with
/// characters outside `[A-Za-z0-9_-]`.
pub fn resolve_embed(url: &str) -> Option<String> {
    let video_id = video_id(url)?;
    Some(format!(
        r#"<iframe width="{}" height="{}" src="https://www.youtube.com/embed/{}" frameborder="0" allowfullscreen></iframe>"#,
        EMBED_WIDTH, EMBED_HEIGHT, video_id
    ))
}

fn video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    let id = match host.as_str() {
        "youtube.com" | "www.youtube.com" | "m.youtube.com" => parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?,
        "youtu.be" => parsed.path_segments()?.next()?.to_string(),
        _ => return None,
    };

    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    valid.then_some(id)
}

/// Replace placeholder anchors in rendered HTML with player markup.
///
/// Matching is literal and case-sensitive on both URL and placeholder.
/// Renderers escape `&` and `"` inside attributes, so the escaped form of
/// the URL is tried as well. References that do not resolve are left as
/// plain links. Returns the new HTML and how many anchors were replaced.
pub fn substitute_video_embeds(html: &str, references: &[VideoReference]) -> (String, usize) {
    let mut output = html.to_string();
    let mut replaced = 0;

    for reference in references {
        let Some(embed) = resolve_embed(&reference.url) else {
            debug!("No embed for {} ({}), leaving link", reference.url, reference.placeholder_id);
            continue;
        };

        let raw = anchor(&reference.url, &reference.placeholder_id);
        let escaped = anchor(&escape_attribute(&reference.url), &reference.placeholder_id);

        for candidate in [raw, escaped] {
            let count = output.matches(candidate.as_str()).count();
            if count > 0 {
                output = output.replace(candidate.as_str(), &embed);
                replaced += count;
            }
        }
    }

    (output, replaced)
}

fn anchor(href: &str, text: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, href, text)
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
