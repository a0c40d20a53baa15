//! Holdings read from a user's records and their NAV enrichment.

use crate::core::config::ColumnsConfig;
use crate::core::metrics::{Metrics, compute_metrics_on};
use crate::core::resolver::NavSnapshot;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// One investment record: a row of the holdings file mapped by column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingRow {
    pub scheme_name: String,
    pub original_nav: Decimal,
    pub transaction_date: String,
    pub amount_invested: Decimal,
    /// Filled by the resolver unless the row already carries a value.
    pub current_nav: Option<Decimal>,
}

impl HoldingRow {
    /// Builds a row from a `column -> value` mapping.
    ///
    /// Missing or non-numeric amounts read as zero so that a bad cell
    /// surfaces as an undefined metric instead of failing the whole file.
    pub fn from_record(record: &HashMap<String, String>, columns: &ColumnsConfig) -> Self {
        let field = |name: &str| record.get(name).map(|v| v.trim()).unwrap_or("");

        HoldingRow {
            scheme_name: field(&columns.scheme_name).to_string(),
            original_nav: parse_decimal(field(&columns.nav)).unwrap_or_default(),
            transaction_date: field(&columns.date).to_string(),
            amount_invested: parse_decimal(field(&columns.amount)).unwrap_or_default(),
            current_nav: parse_decimal(field(&columns.current_nav)),
        }
    }

    /// Query string sent to the resolver for this row.
    pub fn lookup_name(&self) -> String {
        self.scheme_name.trim().to_lowercase()
    }

    pub fn metrics_on(&self, today: NaiveDate) -> Metrics {
        compute_metrics_on(
            self.original_nav,
            self.current_nav.unwrap_or_default(),
            self.amount_invested,
            &self.transaction_date,
            today,
        )
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// A holding after NAV lookup and metric computation.
#[derive(Debug, Clone)]
pub struct EnrichedHolding {
    /// The row as read, used when exporting.
    pub record: HashMap<String, String>,
    pub row: HoldingRow,
    /// Feed scheme name the row was matched to, if any.
    pub matched_scheme: Option<String>,
    pub nav_date: Option<String>,
    pub metrics: Metrics,
}

/// Resolves every row against `snapshot` and computes its metrics.
///
/// A current NAV already present on the row takes precedence over the feed
/// value. Rows keep their input order.
pub fn enrich_holdings(
    records: Vec<HashMap<String, String>>,
    columns: &ColumnsConfig,
    snapshot: &NavSnapshot,
    today: NaiveDate,
) -> Vec<EnrichedHolding> {
    let mut rows: Vec<HoldingRow> = records
        .iter()
        .map(|record| HoldingRow::from_record(record, columns))
        .collect();

    let names: Vec<String> = rows.iter().map(HoldingRow::lookup_name).collect();
    let matches = snapshot.resolve(&names);

    rows.iter_mut()
        .zip(matches)
        .zip(records)
        .map(|((row, matched), record)| {
            let feed_record = matched.record;
            if row.current_nav.is_some() {
                debug!(scheme = %row.scheme_name, "Using current NAV from input row");
            } else {
                row.current_nav = feed_record.as_ref().and_then(|r| r.nav_value());
            }

            EnrichedHolding {
                metrics: row.metrics_on(today),
                row: row.clone(),
                matched_scheme: feed_record.as_ref().map(|r| r.original_name.clone()),
                nav_date: feed_record.map(|r| r.as_of_date),
                record,
            }
        })
        .collect()
}
