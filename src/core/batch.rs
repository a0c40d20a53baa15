//! Batch NAV lookup and its serialized response shape.

use crate::core::feed::FeedSource;
use crate::core::resolver::{MatchResult, NavSnapshot};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info};

pub const NOT_FOUND: &str = "Not found";
pub const FETCH_FAILED: &str = "Failed to fetch NAV data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeNavData {
    pub scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Per-scheme entry of a batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeNavResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub data: SchemeNavData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&MatchResult> for SchemeNavResult {
    fn from(result: &MatchResult) -> Self {
        match &result.record {
            Some(record) => SchemeNavResult {
                status_code: 200,
                data: SchemeNavData {
                    scheme: record.original_name.clone(),
                    nav: Some(record.nav.clone()),
                    date: Some(record.as_of_date.clone()),
                },
                error: None,
            },
            None => SchemeNavResult {
                status_code: 404,
                data: SchemeNavData {
                    scheme: result.query.clone(),
                    nav: None,
                    date: None,
                },
                error: Some(NOT_FOUND.to_string()),
            },
        }
    }
}

/// Whole-batch response: either every per-scheme result, or a single error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResponse {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<SchemeNavResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResponse {
    pub fn success(results: &[MatchResult]) -> Self {
        BatchResponse {
            status: true,
            data: Some(results.iter().map(SchemeNavResult::from).collect()),
            error: None,
        }
    }

    pub fn failure() -> Self {
        BatchResponse {
            status: false,
            data: None,
            error: Some(FETCH_FAILED.to_string()),
        }
    }

    pub fn from_outcome(outcome: &Result<Vec<MatchResult>>) -> Self {
        match outcome {
            Ok(results) => Self::success(results),
            Err(e) => {
                error!(error = %e, "NAV batch failed");
                Self::failure()
            }
        }
    }
}

/// Fetches the feed once and resolves every scheme against it.
///
/// A failed fetch fails the whole batch; unmatched schemes do not.
pub async fn lookup_batch<S: AsRef<str>>(
    source: &dyn FeedSource,
    schemes: &[S],
) -> Result<Vec<MatchResult>> {
    let feed_text = source
        .fetch_feed()
        .await
        .context(FETCH_FAILED)?;
    let snapshot = NavSnapshot::from_feed_text(&feed_text);
    let results = snapshot.resolve(schemes);

    let missing = results.iter().filter(|r| !r.found).count();
    info!(
        requested = results.len(),
        missing, "NAV batch lookup complete"
    );
    Ok(results)
}
