//! Output formatting and persistence for process records.
//!
//! Supports pretty-printing, JSON files, and CSV append of summary rows.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::process::{ProcessRecord, ProcessSummary};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a process record using Rust's debug pretty-print format.
pub fn print_pretty(record: &ProcessRecord) {
    debug!("{:#?}", record);
}

/// Logs a process record as pretty-printed JSON.
pub fn print_json(record: &ProcessRecord) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

/// Appends a [`ProcessSummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, summary: &ProcessSummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}

/// Writes a value as pretty JSON, creating parent directories as needed.
pub fn write_json_file(path: impl AsRef<Path>, value: &impl Serialize) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}
