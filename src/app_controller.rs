use anyhow::{Result, anyhow};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::ConvertError;
use crate::file_utils::FileManager;
use crate::markup::{self, VideoReference};
use crate::renderer::{PandocRenderer, RenderRequest, Renderer};

// @module: Application controller for vault conversion

/// Result of converting one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The page was written
    Converted {
        output: PathBuf,
        videos_embedded: usize,
    },
    /// Skipped because of a front-matter property
    Excluded,
}

/// Counters for a whole folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub converted: usize,
    pub excluded: usize,
    pub failed: usize,
    pub videos_embedded: usize,
    pub duration: Duration,
}

/// Main application controller for vault conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Renderer producing the HTML pages
    renderer: Arc<dyn Renderer>,
}

impl Controller {
    // @method: Create a new controller rendering with pandoc
    pub fn with_config(config: Config) -> Self {
        let renderer = Arc::new(PandocRenderer::new(config.renderer.clone()));
        Self::with_renderer(config, renderer)
    }

    // @method: Create a new controller with a specific renderer
    pub fn with_renderer(config: Config, renderer: Arc<dyn Renderer>) -> Self {
        Self { config, renderer }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert a single document into its mirrored HTML page
    pub async fn convert_document(&self, source_path: &Path) -> Result<ConversionOutcome, ConvertError> {
        let content = tokio::fs::read_to_string(source_path)
            .await
            .map_err(|source| ConvertError::Read {
                path: source_path.to_path_buf(),
                source,
            })?;

        if markup::should_exclude(&content, &self.config.exclude_frontmatter_properties) {
            debug!("Excluded by front-matter: {:?}", source_path);
            return Ok(ConversionOutcome::Excluded);
        }

        let rewritten = markup::rewrite(&content);

        let vault_root = self.config.vault_path();
        let output_path = FileManager::mirrored_output_path(
            source_path,
            &vault_root,
            self.config.destination_path(),
        )
        .map_err(|e| ConvertError::Write {
            path: source_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        })?;

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConvertError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let request = RenderRequest {
            markdown: rewritten.text,
            source_path: source_path.to_path_buf(),
            vault_root,
            output_path: output_path.clone(),
            title: FileManager::document_title(source_path),
            template: self.config.template_path(),
        };

        self.renderer
            .render(&request)
            .await
            .map_err(|source| ConvertError::Render {
                command: self.renderer.describe(&request),
                source,
            })?;

        let videos_embedded = if rewritten.video_references.is_empty() {
            0
        } else {
            // Post-processing problems leave a working page with plain links
            match Self::embed_videos(&output_path, &rewritten.video_references).await {
                Ok(count) => count,
                Err(e) => {
                    warn!("Error during post-processing video links: {}", e);
                    0
                }
            }
        };

        debug!("Converted {:?} -> {:?}", source_path, output_path);
        Ok(ConversionOutcome::Converted {
            output: output_path,
            videos_embedded,
        })
    }

    /// Swap video placeholders in a rendered page for player markup
    async fn embed_videos(output_path: &Path, references: &[VideoReference]) -> Result<usize, ConvertError> {
        let post_process_error = |source| ConvertError::PostProcess {
            path: output_path.to_path_buf(),
            source,
        };
        let html = tokio::fs::read_to_string(output_path)
            .await
            .map_err(post_process_error)?;
        let (html, replaced) = markup::substitute_video_embeds(&html, references);
        if replaced > 0 {
            tokio::fs::write(output_path, html)
                .await
                .map_err(post_process_error)?;
        }
        if replaced < references.len() {
            debug!(
                "{} of {} video links in {:?} kept as plain links",
                references.len() - replaced,
                references.len(),
                output_path
            );
        }
        Ok(replaced)
    }

    /// Convert every document of the configured vault.
    /// Failing documents are written to the error log and skipped.
    pub async fn run_folder(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let vault_root = self.config.vault_path();
        let error_log = self.config.error_log_path();

        if !vault_root.is_dir() {
            return Err(anyhow!("Vault folder does not exist: {:?}", vault_root));
        }

        FileManager::remove_if_exists(&error_log)?;

        info!(
            "Scanning {:?} (excluding: {})",
            vault_root,
            self.config.excluded_folders.join(", ")
        );
        let documents = FileManager::find_documents(&vault_root, |name| self.config.is_excluded_folder(name))?;
        info!("Found {} markdown files to process", documents.len());

        let mut summary = RunSummary::default();
        if documents.is_empty() {
            warn!("No markdown files found in {:?}", vault_root);
            return Ok(summary);
        }

        let progress_bar = ProgressBar::new(documents.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Processing files");

        let concurrency = self.config.concurrent_documents.max(1);
        let mut conversions = stream::iter(documents)
            .map(|path| async move {
                let result = self.convert_document(&path).await;
                (path, result)
            })
            .buffer_unordered(concurrency);

        // Results arrive one at a time here, so error log appends never interleave
        while let Some((path, result)) = conversions.next().await {
            progress_bar.inc(1);
            match result {
                Ok(ConversionOutcome::Converted { videos_embedded, .. }) => {
                    summary.converted += 1;
                    summary.videos_embedded += videos_embedded;
                }
                Ok(ConversionOutcome::Excluded) => {
                    summary.excluded += 1;
                }
                Err(e) => {
                    summary.failed += 1;
                    progress_bar.suspend(|| error!("Conversion failed for {:?}: {}", path, e));
                    if let Err(log_error) =
                        FileManager::append_error_block(&error_log, &path, &e.to_string(), e.command())
                    {
                        warn!("Failed to write error log: {}", log_error);
                    }
                }
            }
        }

        summary.duration = start_time.elapsed();
        progress_bar.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} converted, {} excluded, {} errors, {} videos embedded - Duration: {}",
            summary.converted,
            summary.excluded,
            summary.failed,
            summary.videos_embedded,
            Self::format_duration(summary.duration)
        );
        if summary.failed > 0 {
            warn!("Details of failed documents written to {:?}", error_log);
        }

        Ok(summary)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
