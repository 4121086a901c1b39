/*!
 * External HTML rendering.
 *
 * The rewritten Markdown is handed to an external converter which writes
 * the final page. `Renderer` is the seam the controller talks to;
 * `PandocRenderer` drives a `pandoc`-compatible executable.
 */

use async_trait::async_trait;
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::app_config::RendererConfig;
use crate::errors::RenderError;

/// Everything a renderer needs to produce one page
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Rewritten Markdown
    pub markdown: String,
    /// Original document, used to resolve relative resources
    pub source_path: PathBuf,
    /// Vault root, also used to resolve resources
    pub vault_root: PathBuf,
    /// HTML file to write
    pub output_path: PathBuf,
    /// Page title metadata
    pub title: String,
    /// Template file
    pub template: PathBuf,
}

/// Converts a rendered request into an HTML file on disk
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Command line that `render` would run, for error reports
    fn describe(&self, request: &RenderRequest) -> String {
        format!("{} {}", self.name(), request.output_path.display())
    }

    /// Render `request.markdown` into `request.output_path`
    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError>;
}

/// Renderer backed by pandoc (or any executable accepting the same flags)
#[derive(Debug, Clone)]
pub struct PandocRenderer {
    config: RendererConfig,
}

impl PandocRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Arguments passed to the renderer for a request
    pub fn build_args(&self, request: &RenderRequest) -> Vec<String> {
        let mut args = vec!["--standalone".to_string()];
        if self.config.embed_resources {
            args.push("--embed-resources".to_string());
        }
        args.extend([
            "-f".to_string(),
            self.config.from_format.clone(),
            "-t".to_string(),
            "html".to_string(),
            "--resource-path".to_string(),
            resource_path(&request.vault_root, &request.source_path),
            "--template".to_string(),
            request.template.to_string_lossy().to_string(),
            "--metadata".to_string(),
            format!("title={}", request.title),
        ]);
        if self.config.fail_if_warnings {
            args.push("--fail-if-warnings".to_string());
        }
        args.extend(self.config.extra_args.iter().cloned());
        args.extend([
            "-".to_string(),
            "-o".to_string(),
            request.output_path.to_string_lossy().to_string(),
        ]);
        args
    }
}

/// Vault root and the document's folder, joined with the platform separator
fn resource_path(vault_root: &Path, source_path: &Path) -> String {
    let document_folder = source_path.parent().unwrap_or(vault_root);
    match std::env::join_paths([vault_root, document_folder]) {
        Ok(joined) => joined.to_string_lossy().to_string(),
        Err(_) => vault_root.to_string_lossy().to_string(),
    }
}

#[async_trait]
impl Renderer for PandocRenderer {
    fn name(&self) -> &str {
        &self.config.program
    }

    fn describe(&self, request: &RenderRequest) -> String {
        let mut command = vec![self.config.program.clone()];
        command.extend(self.build_args(request));
        command.join(" ")
    }

    async fn render(&self, request: &RenderRequest) -> Result<(), RenderError> {
        let args = self.build_args(request);
        debug!("Running {} for {:?}", self.config.program, request.source_path);

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RenderError::NotFound {
                    program: self.config.program.clone(),
                },
                _ => RenderError::Io(e),
            })?;

        // Feed stdin while waiting so a renderer that exits early keeps its stderr
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(request.markdown.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let timeout_secs = self.config.timeout_secs;
        let (fed, output) = tokio::select! {
            result = async { tokio::join!(feed, child.wait_with_output()) } => result,
            _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
                return Err(RenderError::Timeout(timeout_secs));
            }
        };
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }
        fed?;

        Ok(())
    }
}

/// Check that the renderer can be started, logging installation help when it can't
pub fn check_renderer_installed(program: &str) -> bool {
    let installed = std::process::Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false);

    if !installed {
        error!("{} is not installed or not in your PATH.", program);
        for line in installation_instructions(std::env::consts::OS, homebrew_available()).lines() {
            error!("{}", line);
        }
    }
    installed
}

fn homebrew_available() -> bool {
    std::process::Command::new("brew")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Platform specific instructions for installing pandoc
pub fn installation_instructions(os: &str, has_homebrew: bool) -> String {
    let body = match os {
        "macos" if has_homebrew => "Homebrew is installed. Install Pandoc using:\n    brew install pandoc".to_string(),
        "macos" => [
            "Homebrew is not installed. You can:",
            "1. Install Homebrew from https://brew.sh, then run: brew install pandoc",
            "2. Or download Pandoc directly from: https://pandoc.org/installing.html",
        ]
        .join("\n"),
        "windows" => [
            "Windows installation options:",
            "1. Download the installer from: https://pandoc.org/installing.html",
            "2. Or use Chocolatey: choco install pandoc",
            "3. Or use Winget: winget install pandoc",
        ]
        .join("\n"),
        _ => [
            "Linux installation options:",
            "1. Use your package manager, e.g.:",
            "   - Debian/Ubuntu: sudo apt-get install pandoc",
            "   - Fedora: sudo dnf install pandoc",
            "   - Arch Linux: sudo pacman -S pandoc",
            "2. Or download from: https://pandoc.org/installing.html",
        ]
        .join("\n"),
    };
    format!(
        "{}\nAfter installation, restart your terminal and run vault2html again.",
        body
    )
}
