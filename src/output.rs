//! Output formatting and persistence for report summaries.
//!
//! Supports pretty-printing, JSON files, and CSV tables.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value to `path` as pretty-printed JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    debug!(path = %path.display(), "Writing JSON");

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

/// Writes `records` to `path` as CSV with a header row, replacing any existing file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = records.len(), "Writing CSV");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
