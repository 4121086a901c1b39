/*!
 * Error types for the vault2html application.
 *
 * This module contains custom error types for the rendering and conversion
 * stages, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when invoking the external HTML renderer
#[derive(Error, Debug)]
pub enum RenderError {
    /// The renderer executable could not be started
    #[error("Renderer '{program}' not found or not in PATH")]
    NotFound {
        /// Program that was looked up
        program: String,
    },

    /// The renderer ran but exited unsuccessfully
    #[error("Renderer exited with {status}: {stderr}")]
    Failed {
        /// Exit status description
        status: String,
        /// Captured standard error output
        stderr: String,
    },

    /// The renderer did not finish in time
    #[error("Renderer timed out after {0} seconds")]
    Timeout(u64),

    /// Piping input to the renderer or waiting for it failed
    #[error("Renderer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while converting a single document
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The source document could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output location could not be prepared
    #[error("Failed to prepare output {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer failed for this document
    #[error("Render error: {source}")]
    Render {
        #[source]
        source: RenderError,
        /// Command line that was attempted
        command: String,
    },

    /// The rendered page could not be updated with video embeds
    #[error("Failed to post-process {path}: {source}")]
    PostProcess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Command line associated with the failure, when there is one
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Render { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// Application-level errors surfaced to the command line
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration handling
    #[error("Configuration error: {0}")]
    Config(String),
}
