//! Generated files and their delivery to disk

use chrono::NaiveDate;
use lightcat_core::FixtureId;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// Longest file name most filesystems accept, in bytes
const MAX_FILE_NAME_BYTES: usize = 255;

/// Global options for one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Date of the export run
    pub date: NaiveDate,
}

impl ExportOptions {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Options dated today
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

/// One generated artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    /// Relative file name; may contain `/` for sub-folders
    pub name: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub mimetype: String,
    /// Fixtures this file was generated from
    pub fixtures: Vec<FixtureId>,
    /// Short name of the exported mode, if the file covers a single mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ExportFile {
    pub fn content_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// Make a string safe to use as a file name.
///
/// Path separators, characters reserved on common filesystems and control
/// characters are removed, trailing dots and spaces are dropped and the
/// result is truncated to 255 bytes. Whitespace runs are then replaced by a
/// single `-`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '?' | '<' | '>' | ':' | '*' | '|' | '"') && !c.is_control())
        .collect();

    let mut cleaned = match cleaned.as_str() {
        "." | ".." => String::new(),
        other => other.trim_end_matches(['.', ' ']).to_string(),
    };

    if cleaned.len() > MAX_FILE_NAME_BYTES {
        let mut end = MAX_FILE_NAME_BYTES;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Write files below `dir`, creating sub-folders for names containing `/`
pub fn write_files(dir: &Path, files: &[ExportFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &file.content)?;
        debug!(path = %path.display(), bytes = file.content.len(), "wrote export file");
        written.push(path);
    }
    Ok(written)
}
