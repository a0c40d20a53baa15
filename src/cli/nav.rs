use super::ui;
use crate::core::{BatchResponse, FeedSource, lookup_batch};
use anyhow::{Result, anyhow};

/// Looks up the current NAV of each scheme and prints the batch response as
/// JSON on stdout.
pub async fn run(schemes: &[String], feed_source: &(dyn FeedSource + Send + Sync)) -> Result<()> {
    let response = fetch_response(schemes, feed_source).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.status {
        Ok(())
    } else {
        Err(anyhow!(
            response
                .error
                .unwrap_or_else(|| "NAV lookup failed".to_string())
        ))
    }
}

async fn fetch_response(
    schemes: &[String],
    feed_source: &(dyn FeedSource + Send + Sync),
) -> BatchResponse {
    let pb = ui::new_spinner("Fetching NAV feed...");
    let outcome = lookup_batch(feed_source, schemes).await;
    pb.finish_and_clear();
    BatchResponse::from_outcome(&outcome)
}
