use super::{export, ui};
use crate::core::config::ColumnsConfig;
use crate::core::batch::FETCH_FAILED;
use crate::core::{EnrichedHolding, FeedSource, NavSnapshot, enrich_holdings};
use crate::providers::csv_holdings::load_holdings;
use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};
use rust_decimal::{Decimal, prelude::*};
use std::path::Path;
use tracing::{debug, info};

/// Sums over the holdings whose metrics are defined. A sum that overflows is
/// `None` and leaves the totals incomplete.
#[derive(Debug, Default, PartialEq, Eq)]
struct ReturnTotals {
    invested: Option<Decimal>,
    returned: Option<Decimal>,
    complete: bool,
}

pub async fn run(
    holdings_path: &Path,
    output_path: Option<&Path>,
    feed_source: &(dyn FeedSource + Send + Sync),
    columns: &ColumnsConfig,
) -> Result<()> {
    info!("Calculating returns for {}", holdings_path.display());

    let holdings_file = load_holdings(holdings_path)?;
    if holdings_file.records.is_empty() {
        println!("No holdings found in {}.", holdings_path.display());
        return Ok(());
    }

    let pb = ui::new_spinner("Fetching NAV feed...");
    let feed = feed_source.fetch_feed().await;
    pb.finish_and_clear();
    let feed_text = feed.context(FETCH_FAILED)?;

    let snapshot = NavSnapshot::from_feed_text(&feed_text);
    let enriched = enrich_holdings(
        holdings_file.records,
        columns,
        &snapshot,
        Utc::now().date_naive(),
    );

    let unmatched = enriched.iter().filter(|h| h.matched_scheme.is_none()).count();
    debug!(rows = enriched.len(), unmatched, "Enriched holdings");

    println!("{}", display_returns(&enriched));

    if let Some(path) = output_path {
        export::write_results(path, &holdings_file.headers, &enriched, columns)?;
        println!(
            "\n{}",
            ui::style_text(&format!("Saved results to {}", path.display()), ui::StyleType::Subtle)
        );
    }

    Ok(())
}

fn calculate_totals(holdings: &[EnrichedHolding]) -> ReturnTotals {
    let invested = checked_sum(holdings.iter().map(|h| h.row.amount_invested));
    let returns: Vec<Option<Decimal>> = holdings.iter().map(|h| h.metrics.return_amount).collect();
    let defined: Vec<Decimal> = returns.iter().flatten().copied().collect();
    let returned = if defined.is_empty() {
        None
    } else {
        checked_sum(defined.iter().copied())
    };

    ReturnTotals {
        complete: invested.is_some()
            && defined.len() == returns.len()
            && (defined.is_empty() || returned.is_some()),
        invested,
        returned,
    }
}

fn checked_sum(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    values.fold(Some(Decimal::ZERO), |acc, v| acc?.checked_add(v))
}

fn display_returns(holdings: &[EnrichedHolding]) -> String {
    let totals = calculate_totals(holdings);
    format!("{}\n\n{}", build_table(holdings), format_totals(&totals))
}

fn build_table(holdings: &[EnrichedHolding]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Scheme"),
        ui::header_cell("Matched Scheme"),
        ui::header_cell("Date"),
        ui::header_cell("NAV"),
        ui::header_cell("Current NAV"),
        ui::header_cell("Amount"),
        ui::header_cell("Units"),
        ui::header_cell("CAGR (%)"),
        ui::header_cell("Return"),
    ]);

    for holding in holdings {
        let row = &holding.row;
        let metrics = &holding.metrics;

        let matched = match &holding.matched_scheme {
            Some(name) => Cell::new(ui::style_text(name, ui::StyleType::Subtle)),
            None => ui::na_cell(true),
        };
        let cagr = match metrics.cagr_percent.and_then(|c| c.to_f64()) {
            Some(c) => ui::change_cell(c),
            None => ui::na_cell(false),
        };

        table.add_row(vec![
            Cell::new(&row.scheme_name),
            matched,
            Cell::new(&row.transaction_date),
            ui::format_optional_cell(Some(row.original_nav), |v| v.to_string()),
            ui::format_optional_cell(row.current_nav, |v| v.to_string()),
            ui::format_optional_cell(Some(row.amount_invested), |v| format!("{v:.2}")),
            ui::format_optional_cell(metrics.units, |v| v.to_string()),
            cagr,
            ui::format_optional_cell(metrics.return_amount, |v| format!("{v:.2}")),
        ]);
    }
    table
}

fn format_totals(totals: &ReturnTotals) -> String {
    // Partial sums are flagged when some holdings have no return
    let total_style_type = if totals.complete {
        ui::StyleType::TotalValue
    } else {
        ui::StyleType::Error
    };
    let format_total =
        |total: Option<Decimal>| total.map_or("N/A".to_string(), |v| format!("{v:.2}"));
    let invested = format_total(totals.invested);
    let returned = format_total(totals.returned);

    format!(
        "{}: {}\n{}: {}",
        ui::style_text("Total Invested", ui::StyleType::TotalLabel),
        invested,
        ui::style_text("Total Return", ui::StyleType::TotalLabel),
        ui::style_text(&returned, total_style_type)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use comfy_table::ContentArrangement;
    use std::collections::HashMap;
    use std::fs;

    struct StaticFeed(Option<&'static str>);

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch_feed(&self) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow!("feed unavailable"))
        }
    }

    const FEED: &str = "1;x;x;SBI Bluechip Fund - Direct Plan - Growth;150;01-Jan-2024\n";

    fn enriched(rows: &[(&str, &str, &str)]) -> Vec<EnrichedHolding> {
        let records = rows
            .iter()
            .map(|(name, nav, amount)| {
                HashMap::from([
                    ("SchemeName".to_string(), name.to_string()),
                    ("NAV".to_string(), nav.to_string()),
                    ("Date".to_string(), "07/01/2020".to_string()),
                    ("Amount".to_string(), amount.to_string()),
                ])
            })
            .collect();
        enrich_holdings(
            records,
            &ColumnsConfig::default(),
            &NavSnapshot::from_feed_text(FEED),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        )
    }

    #[test]
    fn test_calculate_totals() {
        let holdings = enriched(&[
            ("SBI Bluechip Direct Growth", "100", "10000"),
            ("Unknown Fund", "10", "500"),
        ]);
        let totals = calculate_totals(&holdings);
        assert_eq!(totals.invested, Some(Decimal::from(10500)));
        assert_eq!(totals.returned, Some(Decimal::new(1084472, 2)));
        assert!(!totals.complete);

        let totals = calculate_totals(&holdings[..1]);
        assert!(totals.complete);

        assert_eq!(
            calculate_totals(&[]),
            ReturnTotals {
                invested: Some(Decimal::ZERO),
                returned: None,
                complete: true,
            }
        );
    }

    #[test]
    fn test_calculate_totals_overflow() {
        let max = Decimal::MAX.to_string();
        let holdings = enriched(&[
            ("Unknown Fund", "10", max.as_str()),
            ("Another Fund", "10", max.as_str()),
        ]);
        let totals = calculate_totals(&holdings);
        assert_eq!(totals.invested, None);
        assert_eq!(totals.returned, None);
        assert!(!totals.complete);

        let output = format_totals(&totals);
        assert!(output.contains("Total Invested"));
        assert!(output.contains("N/A"));
    }

    #[test]
    fn test_build_table() {
        let holdings = enriched(&[
            ("SBI Bluechip Direct Growth", "100", "10000"),
            ("Unknown Fund", "10", "500"),
        ]);
        let mut table = build_table(&holdings);
        table.set_content_arrangement(ContentArrangement::Disabled);
        let output = table.to_string();

        assert!(output.contains("SBI Bluechip Direct Growth"));
        assert!(output.contains("8.4472%"));
        assert!(output.contains("10844.72"));
        assert!(output.contains("Unknown Fund"));
        assert!(output.contains("N/A"));
    }

    #[test]
    fn test_format_totals() {
        let holdings = enriched(&[("SBI Bluechip Direct Growth", "100", "10000")]);
        let output = format_totals(&calculate_totals(&holdings));
        assert!(output.contains("10000.00"));
        assert!(output.contains("10844.72"));

        let output = display_returns(&[]);
        assert!(output.contains("0.00"));
        assert!(output.contains("N/A"));
    }

    #[tokio::test]
    async fn test_run_with_export() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("holdings.csv");
        let output = dir.path().join("out.csv");
        fs::write(
            &input,
            "SchemeName,NAV,Date,Amount\nSBI Bluechip Direct Growth,100,07/01/2020,10000\n",
        )?;

        run(&input, Some(&output), &StaticFeed(Some(FEED)), &ColumnsConfig::default()).await?;

        let exported = fs::read_to_string(&output)?;
        let mut lines = exported.lines();
        assert_eq!(
            lines.next(),
            Some("SchemeName,NAV,Date,Amount,CurrentNAV,CAGR,Units,TotalGain,ReturnAmount")
        );
        assert!(
            lines
                .next()
                .unwrap()
                .starts_with("SBI Bluechip Direct Growth,100,07/01/2020,10000,150,")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_run_fails_when_feed_unavailable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("holdings.csv");
        fs::write(&input, "SchemeName,NAV,Date,Amount\nA,1,07/01/2020,1\n")?;

        let err = run(&input, None, &StaticFeed(None), &ColumnsConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch NAV data");
        Ok(())
    }
}
