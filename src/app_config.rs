use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Root folder of the vault to convert
    #[serde(alias = "obsidian_folder")]
    pub vault_folder: String,

    /// Folder receiving the generated HTML tree
    pub destination_folder: String,

    /// Folder names skipped at any depth while walking the vault
    #[serde(default = "default_excluded_folders")]
    pub excluded_folders: Vec<String>,

    /// Documents with any of these front-matter properties set to true are skipped
    /// (e.g. ["foldernote", "private"])
    #[serde(default)]
    pub exclude_frontmatter_properties: Vec<String>,

    /// HTML template handed to the renderer (user-customizable)
    #[serde(default = "default_template_file")]
    pub template_file: String,

    /// File collecting per-document failures, recreated on every run
    #[serde(default = "default_error_log_file")]
    pub error_log_file: String,

    /// Maximum number of documents converted at the same time
    #[serde(default = "default_concurrent_documents")]
    pub concurrent_documents: usize,

    /// External renderer settings
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// External renderer configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RendererConfig {
    // @field: Executable name or path
    #[serde(default = "default_renderer_program")]
    pub program: String,

    // @field: Input format passed with -f
    #[serde(default = "default_from_format")]
    pub from_format: String,

    // @field: Inline images and other resources into the page
    #[serde(default = "default_true")]
    pub embed_resources: bool,

    // @field: Treat renderer warnings as failures
    #[serde(default = "default_true")]
    pub fail_if_warnings: bool,

    // @field: Additional arguments appended before the input marker
    #[serde(default)]
    pub extra_args: Vec<String>,

    // @field: Timeout seconds per document
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: default_renderer_program(),
            from_format: default_from_format(),
            embed_resources: true,
            fail_if_warnings: true,
            extra_args: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_excluded_folders() -> Vec<String> {
    ["_excalidraw", "_resources", "_templates", ".obsidian", ".trash"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_template_file() -> String {
    "templates/user.html".to_string()
}

fn default_error_log_file() -> String {
    "errors.txt".to_string()
}

fn default_concurrent_documents() -> usize {
    4
}

fn default_renderer_program() -> String {
    "pandoc".to_string()
}

fn default_from_format() -> String {
    "markdown+hard_line_breaks".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Create a configuration for a vault and destination with default settings
    pub fn new<S1: Into<String>, S2: Into<String>>(vault_folder: S1, destination_folder: S2) -> Self {
        Self {
            vault_folder: vault_folder.into(),
            destination_folder: destination_folder.into(),
            ..Self::default()
        }
    }

    /// Load a configuration file, filling missing optional keys with defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.vault_folder.trim().is_empty() {
            return Err(AppError::Config("vault_folder must not be empty".to_string()));
        }
        if self.destination_folder.trim().is_empty() {
            return Err(AppError::Config("destination_folder must not be empty".to_string()));
        }
        if !self.vault_path().is_dir() {
            return Err(AppError::Config(format!(
                "Vault folder does not exist: {}",
                self.vault_folder
            )));
        }
        if self.concurrent_documents == 0 {
            return Err(AppError::Config("concurrent_documents must be at least 1".to_string()));
        }
        if self.renderer.program.trim().is_empty() {
            return Err(AppError::Config("renderer.program must not be empty".to_string()));
        }
        if self.renderer.timeout_secs == 0 {
            return Err(AppError::Config("renderer.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn vault_path(&self) -> PathBuf {
        PathBuf::from(&self.vault_folder)
    }

    pub fn destination_path(&self) -> PathBuf {
        PathBuf::from(&self.destination_folder)
    }

    pub fn template_path(&self) -> PathBuf {
        PathBuf::from(&self.template_file)
    }

    pub fn error_log_path(&self) -> PathBuf {
        PathBuf::from(&self.error_log_file)
    }

    /// Whether a folder name is excluded from the walk, at any depth
    pub fn is_excluded_folder(&self, name: &str) -> bool {
        self.excluded_folders.iter().any(|excluded| excluded == name)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            vault_folder: String::new(),
            destination_folder: String::new(),
            excluded_folders: default_excluded_folders(),
            exclude_frontmatter_properties: Vec::new(),
            template_file: default_template_file(),
            error_log_file: default_error_log_file(),
            concurrent_documents: default_concurrent_documents(),
            renderer: RendererConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
