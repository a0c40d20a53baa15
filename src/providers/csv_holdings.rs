//! Reads holdings files: CSV with a header row, one investment per line.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Rows of a holdings file, keyed by header, plus the header order.
#[derive(Debug, Clone, Default)]
pub struct HoldingsFile {
    pub headers: Vec<String>,
    pub records: Vec<HashMap<String, String>>,
}

pub fn load_holdings<P: AsRef<Path>>(path: P) -> Result<HoldingsFile> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .with_context(|| format!("Failed to open holdings file: {}", path.display()))?;
    read_holdings(reader)
        .with_context(|| format!("Failed to parse holdings file: {}", path.display()))
}

fn read_holdings<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<HoldingsFile> {
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        let record = result.with_context(|| format!("Invalid record at row {}", i + 1))?;
        if record.values().all(|v| v.trim().is_empty()) {
            continue;
        }
        records.push(record);
    }

    debug!(rows = records.len(), "Loaded holdings");
    Ok(HoldingsFile { headers, records })
}
