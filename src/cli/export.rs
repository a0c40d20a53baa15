//! Writes enriched holdings back out as CSV.

use crate::core::EnrichedHolding;
use crate::core::config::ColumnsConfig;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const DEFAULT_EXPORT_FILE: &str = "cagr_results.csv";

const CAGR_COLUMN: &str = "CAGR";
const UNITS_COLUMN: &str = "Units";
const GAIN_COLUMN: &str = "TotalGain";
const RETURN_COLUMN: &str = "ReturnAmount";

pub fn write_results<P: AsRef<Path>>(
    path: P,
    headers: &[String],
    holdings: &[EnrichedHolding],
    columns: &ColumnsConfig,
) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_csv(file, headers, holdings, columns)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    info!("Wrote {} rows to {}", holdings.len(), path.display());
    Ok(())
}

fn write_csv<W: Write>(
    writer: W,
    headers: &[String],
    holdings: &[EnrichedHolding],
    columns: &ColumnsConfig,
) -> Result<()> {
    let derived = [
        columns.current_nav.as_str(),
        CAGR_COLUMN,
        UNITS_COLUMN,
        GAIN_COLUMN,
        RETURN_COLUMN,
    ];
    // Input columns that are recomputed are written once, in the derived block
    let passthrough: Vec<&String> = headers
        .iter()
        .filter(|h| !derived.contains(&h.as_str()))
        .collect();

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(passthrough.iter().map(|h| h.as_str()).chain(derived))?;

    for holding in holdings {
        let metrics = &holding.metrics;
        let mut row: Vec<String> = passthrough
            .iter()
            .map(|h| holding.record.get(*h).cloned().unwrap_or_default())
            .collect();
        row.extend(
            [
                holding.row.current_nav,
                metrics.cagr_percent,
                metrics.units,
                metrics.total_gain,
                metrics.return_amount,
            ]
            .map(format_optional),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn format_optional(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
