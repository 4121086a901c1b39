/*!
 * Front-matter inspection.
 *
 * Documents may start with a `---` delimited block of YAML-like key/value
 * pairs. A document is skipped entirely when one of the configured
 * properties is set to a truthy value there.
 */

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Opening fence on the first line, closing fence on its own line
static FRONTMATTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A---[ \t]*\r?\n((?s:.*?))\r?\n---[ \t]*(?:\r?\n|\z)")
        .expect("Invalid front-matter regex")
});

/// Return the body of the front-matter block, without the fences
pub fn extract_frontmatter(text: &str) -> Option<&str> {
    FRONTMATTER_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str())
}

/// Check whether any of `properties` is set to `true|yes|y|on|1` in the
/// document's front-matter. Keys and values are matched case-insensitively.
pub fn should_exclude<S: AsRef<str>>(text: &str, properties: &[S]) -> bool {
    if properties.is_empty() {
        return false;
    }
    let Some(frontmatter) = extract_frontmatter(text) else {
        return false;
    };

    properties
        .iter()
        .map(|property| <S as AsRef<str>>::as_ref(property).trim())
        .filter(|property| !property.is_empty())
        .any(|property| property_is_truthy(frontmatter, property))
}

fn property_is_truthy(frontmatter: &str, property: &str) -> bool {
    let pattern = format!(
        r#"^[ \t]*["']?{}["']?[ \t]*:[ \t]*["']?(?:true|yes|y|on|1)["']?[ \t]*\r?$"#,
        regex::escape(property)
    );
    match RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
    {
        Ok(regex) => regex.is_match(frontmatter),
        Err(_) => false,
    }
}
