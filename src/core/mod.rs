//! Core business logic: scheme matching, NAV lookup and return metrics

pub mod batch;
pub mod config;
pub mod feed;
pub mod holding;
pub mod log;
pub mod metrics;
pub mod resolver;
pub mod scheme;

// Re-export main types for cleaner imports
pub use batch::{BatchResponse, lookup_batch};
pub use feed::{FeedRecord, FeedSource};
pub use holding::{EnrichedHolding, HoldingRow, enrich_holdings};
pub use metrics::{Metrics, TransactionDate, compute_metrics};
pub use resolver::{MatchResult, NavSnapshot, resolve, split_scheme_list};
pub use scheme::{Plan, SchemeDescriptor, Variant, normalize};
