//! Append-only CSV log.
//!
//! One header row, then one data row per invocation. No locking: each
//! invocation is the only writer for the lifetime of the process.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};

use crate::record::SampleRecord;

/// Column order is fixed; `SampleRecord`'s field order must match.
pub const LOG_HEADER: [&str; 6] = [
    "hour",
    "timestamp",
    "ton_price",
    "ton_price_received_at",
    "volume_usd_float",
    "volume_usd_received_at",
];

/// Create the log with its header row if it does not exist yet.
/// Idempotent; an existing file is left untouched.
pub fn ensure_initialized(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let file =
        File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(LOG_HEADER).context("write header")?;
    writer.flush().context("flush header")?;
    Ok(())
}

/// Append one record as the last line of the log.
pub fn append(path: &Path, record: &SampleRecord) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.serialize(record).context("write record")?;
    writer.flush().context("flush record")?;
    Ok(())
}

/// All non-blank lines of the log, in order.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read log file {}", path.display()))?;
    Ok(text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}
