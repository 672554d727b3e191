//! Result Sink
//!
//! Persists the merged transcripts of a batch run.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Fixed name of the output artifact
pub const RESULT_FILE: &str = "result.json";

/// Sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize transcripts as tab-indented JSON
pub fn to_json(transcripts: &BTreeMap<String, String>) -> Result<Vec<u8>, SinkError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    transcripts.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write the artifact into `dir`, replacing any previous run's file
pub fn write_results(
    dir: &Path,
    transcripts: &BTreeMap<String, String>,
) -> Result<PathBuf, SinkError> {
    let path = dir.join(RESULT_FILE);
    let json = to_json(transcripts)?;
    std::fs::write(&path, json)?;

    tracing::info!("Results written to {:?}", path);
    Ok(path)
}
