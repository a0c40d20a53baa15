//! Time-value-of-money metrics for a single holding.

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, prelude::*};
use serde::Serialize;
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.0;
const CAGR_DP: u32 = 4;
const AMOUNT_DP: u32 = 2;
const UNITS_DP: u32 = 4;

/// Transaction date as written in a holdings file.
///
/// A hyphen selects the ISO `YYYY-MM-DD` layout, anything else is read as
/// `MM/DD/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionDate {
    Iso(NaiveDate),
    UsSlashed(NaiveDate),
    Unparseable,
}

impl TransactionDate {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let parsed = if text.contains('-') {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map(TransactionDate::Iso)
        } else {
            NaiveDate::parse_from_str(text, "%m/%d/%Y").map(TransactionDate::UsSlashed)
        };

        parsed.unwrap_or_else(|e| {
            debug!("Could not parse transaction date '{}': {}", text, e);
            TransactionDate::Unparseable
        })
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            TransactionDate::Iso(date) | TransactionDate::UsSlashed(date) => Some(*date),
            TransactionDate::Unparseable => None,
        }
    }

    /// Years elapsed from the transaction to `today`, using a fixed 365 day
    /// year. Unparseable dates count as zero years.
    pub fn years_until(&self, today: NaiveDate) -> f64 {
        self.date()
            .map(|date| (today - date).num_days() as f64 / DAYS_PER_YEAR)
            .unwrap_or(0.0)
    }
}

/// Derived return figures. `None` means the inputs were not sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Metrics {
    pub cagr_percent: Option<Decimal>,
    pub total_gain: Option<Decimal>,
    pub return_amount: Option<Decimal>,
    pub units: Option<Decimal>,
}

/// Computes metrics as of today (UTC).
pub fn compute_metrics(
    original_nav: Decimal,
    current_nav: Decimal,
    amount_invested: Decimal,
    transaction_date: &str,
) -> Metrics {
    compute_metrics_on(
        original_nav,
        current_nav,
        amount_invested,
        transaction_date,
        Utc::now().date_naive(),
    )
}

/// Computes metrics as of `today`.
pub fn compute_metrics_on(
    original_nav: Decimal,
    current_nav: Decimal,
    amount_invested: Decimal,
    transaction_date: &str,
    today: NaiveDate,
) -> Metrics {
    let years = TransactionDate::parse(transaction_date).years_until(today);
    let units = calculate_units(amount_invested, original_nav);

    let Some(cagr) = calculate_cagr(original_nav, current_nav, years) else {
        return Metrics {
            units,
            ..Metrics::default()
        };
    };

    let total_gain = amount_invested
        .checked_mul(cagr)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED));
    let return_amount = total_gain.and_then(|gain| amount_invested.checked_add(gain));

    debug!("cagr: {original_nav}, {current_nav}, {years}yrs = {cagr}");

    Metrics {
        cagr_percent: Some(cagr.round_dp(CAGR_DP)),
        total_gain: total_gain.map(|v| v.round_dp(AMOUNT_DP)),
        return_amount: return_amount.map(|v| v.round_dp(AMOUNT_DP)),
        units,
    }
}

/// Annualised growth in percent, unrounded.
fn calculate_cagr(original_nav: Decimal, current_nav: Decimal, years: f64) -> Option<Decimal> {
    if original_nav <= Decimal::ZERO || current_nav <= Decimal::ZERO || years <= 0.0 {
        return None;
    }

    let ratio = current_nav.checked_div(original_nav)?.to_f64()?;
    let rate = (ratio.powf(1.0 / years) - 1.0) * 100.0;
    if !rate.is_finite() {
        return None;
    }
    Decimal::from_f64(rate)
}

fn calculate_units(amount_invested: Decimal, original_nav: Decimal) -> Option<Decimal> {
    if original_nav <= Decimal::ZERO {
        return None;
    }
    amount_invested
        .checked_div(original_nav)
        .map(|v| v.round_dp(UNITS_DP))
}
