/*!
 * Mock renderer for testing
 *
 * Produces a tiny HTML page without calling an external program. Markdown
 * links become anchors the way pandoc writes them, which is all the video
 * post-processing needs.
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Mutex;

use vault2html::errors::RenderError;
use vault2html::renderer::{RenderRequest, Renderer};

static LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("Invalid link regex")
});

/// How the mock should behave
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Always write the page
    #[default]
    Succeed,
    /// Fail documents whose title is listed
    FailTitles(Vec<String>),
    /// Behave as if the executable is not installed
    Missing,
    /// Report success without writing the page
    NoOutput,
}

/// Renderer that writes a minimal page and records every request
#[derive(Debug, Default)]
pub struct MockRenderer {
    pub behavior: MockBehavior,
    pub requests: Mutex<Vec<RenderRequest>>,
}

impl MockRenderer {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Titles of the documents rendered so far, sorted
    pub fn rendered_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.title.clone())
            .collect();
        titles.sort();
        titles
    }

    fn to_html(markdown: &str, title: &str) -> String {
        let body = LINK_REGEX.replace_all(markdown, |caps: &regex::Captures| {
            format!(r#"<a href="{}">{}</a>"#, caps[2].replace('&', "&amp;"), &caps[1])
        });
        format!("<html><head><title>{}</title></head><body>\n{}\n</body></html>\n", title, body)
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.behavior {
            MockBehavior::Missing => {
                return Err(RenderError::NotFound {
                    program: "mock".to_string(),
                });
            }
            MockBehavior::FailTitles(titles) if titles.contains(&request.title) => {
                return Err(RenderError::Failed {
                    status: "exit status: 64".to_string(),
                    stderr: format!("could not convert {}", request.title),
                });
            }
            MockBehavior::NoOutput => return Ok(()),
            _ => {}
        }

        let html = Self::to_html(&request.markdown, &request.title);
        tokio::fs::write(&request.output_path, html).await?;
        Ok(())
    }
}
