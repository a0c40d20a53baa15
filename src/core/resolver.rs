//! Resolves free-text scheme names against a NAV feed snapshot.

use crate::core::feed::FeedRecord;
use crate::core::scheme::{SchemeDescriptor, normalize};
use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{debug, trace};

/// A scheme name to look up, normalized once.
#[derive(Debug, Clone)]
pub struct SchemeQuery {
    pub raw_name: String,
    descriptor: SchemeDescriptor,
}

impl SchemeQuery {
    pub fn new(raw_name: &str) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            descriptor: normalize(raw_name).to_match_key(),
        }
    }

    pub fn descriptor(&self) -> &SchemeDescriptor {
        &self.descriptor
    }
}

/// Outcome of looking up a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub query: String,
    pub found: bool,
    pub record: Option<FeedRecord>,
}

impl MatchResult {
    fn found(query: &str, record: &FeedRecord) -> Self {
        Self {
            query: query.to_string(),
            found: true,
            record: Some(record.clone()),
        }
    }

    fn not_found(query: &str) -> Self {
        Self {
            query: query.to_string(),
            found: false,
            record: None,
        }
    }
}

/// Parsed, read-only view of one fetch of the NAV feed.
///
/// Built once per batch and dropped with it; nothing is shared between
/// batches.
#[derive(Debug, Clone, Default)]
pub struct NavSnapshot {
    records: Vec<FeedRecord>,
}

impl NavSnapshot {
    pub fn from_feed_text(feed_text: &str) -> Self {
        let mut skipped = 0usize;
        let records: Vec<FeedRecord> = feed_text
            .lines()
            .filter_map(|line| {
                let record = FeedRecord::from_line(line);
                if record.is_none() {
                    trace!(line, "Skipping malformed feed line");
                    skipped += 1;
                }
                record
            })
            .collect();

        debug!(
            records = records.len(),
            skipped, "Parsed NAV feed snapshot"
        );
        Self { records }
    }

    pub fn records(&self) -> &[FeedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record in feed order that accepts the query.
    pub fn find(&self, query: &SchemeQuery) -> Option<&FeedRecord> {
        self.records
            .iter()
            .find(|record| record.descriptor.accepts(query.descriptor()))
    }

    /// Looks up every query, returning one result per query in input order.
    pub fn resolve<S: AsRef<str>>(&self, queries: &[S]) -> Vec<MatchResult> {
        queries
            .iter()
            .map(|name| {
                let query = SchemeQuery::new(name.as_ref());
                match self.find(&query) {
                    Some(record) => {
                        debug!(
                            query = %query.raw_name,
                            matched = %record.original_name,
                            nav = %record.nav,
                            "Resolved scheme"
                        );
                        MatchResult::found(&query.raw_name, record)
                    }
                    None => {
                        debug!(query = %query.raw_name, "No matching scheme in feed");
                        MatchResult::not_found(&query.raw_name)
                    }
                }
            })
            .collect()
    }
}

/// Parses `feed_text` and resolves `queries` against it.
pub fn resolve<S: AsRef<str>>(feed_text: &str, queries: &[S]) -> Vec<MatchResult> {
    NavSnapshot::from_feed_text(feed_text).resolve(queries)
}

/// Splits a comma separated list of scheme names, trimming each entry.
pub fn split_scheme_list(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        bail!("No schemes provided");
    }
    Ok(raw.split(',').map(|s| s.trim().to_string()).collect())
}
