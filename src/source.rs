//! Work Source
//!
//! Enumerates the audio files of a batch run.

use std::path::{Path, PathBuf};

/// One unit of batch work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Path to the audio file
    pub path: PathBuf,
    /// Identifier used in progress lines and as the result key
    pub key: String,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key = path.display().to_string();
        Self { path, key }
    }
}

/// Source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// List the files in `dir` whose names match `pattern`, sorted by path
///
/// Patterns are a literal name, `*`, or a single `*` with a prefix
/// and/or suffix (e.g. `*.raw`, `part-*`). Subdirectories are skipped.
pub fn scan_dir(dir: &Path, pattern: &str) -> Result<Vec<WorkItem>, SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SourceError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let file_type = entry.file_type().map_err(|source| SourceError::ReadDir {
            path: entry.path(),
            source,
        })?;
        if !file_type.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let name = match file_name.to_str() {
            Some(name) => name,
            None => {
                tracing::warn!("Skipping non-UTF-8 file name {:?}", file_name);
                continue;
            }
        };

        if matches_pattern(pattern, name) {
            items.push(WorkItem::new(entry.path()));
        }
    }

    items.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(items)
}

fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == name,
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
    }
}
