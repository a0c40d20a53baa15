//! NAV feed abstractions and line parsing

use crate::core::scheme::{SchemeDescriptor, normalize};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Minimum number of `;` separated fields in a usable feed line.
const MIN_FIELDS: usize = 6;
const NAME_FIELD: usize = 3;
const NAV_FIELD: usize = 4;
const DATE_FIELD: usize = 5;

/// One scheme entry of the bulk NAV feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedRecord {
    pub original_name: String,
    /// Descriptor with a lowercased base, ready for matching.
    pub descriptor: SchemeDescriptor,
    /// NAV exactly as published, e.g. `85.32` or `N.A.`.
    pub nav: String,
    pub as_of_date: String,
}

impl FeedRecord {
    /// Parses a single feed line.
    ///
    /// Returns `None` for headers, blank lines, fund house captions and any
    /// other line with fewer than six fields.
    pub fn from_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(';').collect();
        if parts.len() < MIN_FIELDS {
            return None;
        }

        let original_name = parts[NAME_FIELD].trim().to_string();
        let descriptor = normalize(&original_name).to_match_key();

        Some(FeedRecord {
            original_name,
            descriptor,
            nav: parts[NAV_FIELD].trim().to_string(),
            as_of_date: parts[DATE_FIELD].trim().to_string(),
        })
    }

    /// Numeric NAV, if the published value is a number.
    pub fn nav_value(&self) -> Option<Decimal> {
        Decimal::from_str(&self.nav).ok()
    }
}

/// Source of the raw bulk NAV feed text.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheme::{Plan, Variant};

    #[test]
    fn test_from_line_valid() {
        let line =
            "119598;INF200K01QX4;-;SBI Bluechip Fund - Direct Plan - Growth ; 85.32 ;01-Jan-2024";
        let record = FeedRecord::from_line(line).unwrap();

        assert_eq!(record.original_name, "SBI Bluechip Fund - Direct Plan - Growth");
        assert_eq!(record.descriptor.base, "sbi bluechip fund");
        assert_eq!(record.descriptor.plan, Plan::Direct);
        assert_eq!(record.descriptor.variant, Variant::Growth);
        assert_eq!(record.nav, "85.32");
        assert_eq!(record.as_of_date, "01-Jan-2024");
        assert_eq!(record.nav_value(), Some(Decimal::new(8532, 2)));
    }

    #[test]
    fn test_from_line_skips_short_lines() {
        assert!(FeedRecord::from_line("").is_none());
        let section = "Open Ended Schemes(Debt Scheme - Banking and PSU Fund)";
        assert!(FeedRecord::from_line(section).is_none());
        assert!(FeedRecord::from_line("a;b;c;d;e").is_none());
    }

    #[test]
    fn test_header_line_is_parsed_like_any_other() {
        let header = "Scheme Code;ISIN Div Payout/ ISIN Growth;ISIN Div Reinvestment;\
                      Scheme Name;Net Asset Value;Date";
        let record = FeedRecord::from_line(header).unwrap();
        assert_eq!(record.original_name, "Scheme Name");
        assert!(record.nav_value().is_none());
    }

    #[test]
    fn test_non_numeric_nav() {
        let record = FeedRecord::from_line("1;2;3;Closed Fund;N.A.;01-Jan-2024").unwrap();
        assert_eq!(record.nav, "N.A.");
        assert!(record.nav_value().is_none());
    }
}
