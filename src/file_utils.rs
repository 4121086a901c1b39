use anyhow::{Context, Result, anyhow};
use chrono::Local;
use log::warn;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Base HTML template written out when the user template is missing
pub const BASE_TEMPLATE: &str = include_str!("../templates/template.html");

/// Extension of vault documents
pub const DOCUMENT_EXTENSION: &str = "md";

const ERROR_LOG_RULE_WIDTH: usize = 80;

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find vault documents below `root`, skipping any folder whose name
    /// `is_excluded` accepts. Unreadable entries are logged and skipped.
    /// The result is sorted for a stable order.
    pub fn find_documents<P, F>(root: P, is_excluded: F) -> Result<Vec<PathBuf>>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> bool,
    {
        let root = root.as_ref();
        let mut result = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !is_excluded(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(anyhow!("Failed to read vault folder {:?}: {}", root, e));
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if entry.file_type().is_file() && Self::is_document(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Whether a path has the document extension (case-insensitive)
    pub fn is_document<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(DOCUMENT_EXTENSION))
    }

    // @generates: Output path mirroring the source layout
    // @params: source_file, vault_root, destination_root
    pub fn mirrored_output_path<P1: AsRef<Path>, P2: AsRef<Path>, P3: AsRef<Path>>(
        source_file: P1,
        vault_root: P2,
        destination_root: P3,
    ) -> Result<PathBuf> {
        let source_file = source_file.as_ref();
        let relative = source_file.strip_prefix(vault_root.as_ref()).map_err(|_| {
            anyhow!(
                "{:?} is not inside the vault {:?}",
                source_file,
                vault_root.as_ref()
            )
        })?;

        Ok(destination_root.as_ref().join(relative).with_extension("html"))
    }

    /// Document title handed to the renderer: the file name without extension
    pub fn document_title<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Remove a file if it is there
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_file(path).with_context(|| format!("Failed to remove file: {:?}", path))?;
        }
        Ok(())
    }

    /// Append a failure block for one document to the error log
    pub fn append_error_block<P: AsRef<Path>>(
        path: P,
        document: &Path,
        message: &str,
        command: Option<&str>,
    ) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        let mut block = format!("===== {} =====\n", document.display());
        block.push_str(&format!("[{}] Error: {}\n", timestamp, message));
        if let Some(command) = command {
            block.push_str(&format!("Command: {}\n", command));
        }
        block.push_str(&"=".repeat(ERROR_LOG_RULE_WIDTH));
        block.push_str("\n\n");

        file.write_all(block.as_bytes())
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Whether `folder` contains a sub-folder called `name`
    pub fn contains_folder<P: AsRef<Path>>(folder: P, name: &str) -> bool {
        folder.as_ref().join(name).is_dir()
    }

    /// Whether a folder is empty, ignoring `.DS_Store`. A missing folder counts as empty.
    pub fn folder_empty<P: AsRef<Path>>(folder: P) -> Result<bool> {
        let folder = folder.as_ref();
        if !folder.exists() {
            return Ok(true);
        }
        for entry in fs::read_dir(folder).with_context(|| format!("Failed to list {:?}", folder))? {
            let entry = entry?;
            if !entry.file_name().to_string_lossy().eq_ignore_ascii_case(".ds_store") {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Strip trailing path separators, keeping a lone root
    pub fn remove_trailing_slash(path: &str) -> String {
        let trimmed = path.trim();
        let stripped = trimmed.trim_end_matches(['/', '\\']);
        if stripped.is_empty() && !trimmed.is_empty() {
            trimmed[..1].to_string()
        } else {
            stripped.to_string()
        }
    }

    /// Make sure the user template exists, creating it from the base template.
    /// Returns true when the file was created.
    pub fn setup_template<P: AsRef<Path>>(template_path: P) -> Result<bool> {
        let template_path = template_path.as_ref();
        if template_path.exists() {
            return Ok(false);
        }
        Self::write_to_file(template_path, BASE_TEMPLATE)?;
        Ok(true)
    }
}
