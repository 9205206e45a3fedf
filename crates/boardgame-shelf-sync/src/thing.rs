//! Batched game metadata from the `thing` endpoint.
//!
//! Chunks are fetched strictly one after another with a fixed pause in
//! between, to stay well under BGG's rate limits.

use std::collections::BTreeMap;

use boardgame_shelf::{contains_item, parse_items, GameRecord};
use tracing::{info, warn};

use crate::client::BggClient;
use crate::config::BatchPolicy;
use crate::error::{SyncError, SyncResult};
use crate::retry::wait_before_retry;

/// Fetch and parse metadata for `ids`, keyed by BGG id.
///
/// Any chunk that never returns items fails the whole fetch.
pub async fn fetch_things(
    client: &BggClient,
    ids: &[u64],
    policy: &BatchPolicy,
) -> SyncResult<BTreeMap<u64, GameRecord>> {
    let chunk_size = policy.chunk_size.max(1);
    let chunk_count = ids.len().div_ceil(chunk_size);
    let mut by_id = BTreeMap::new();

    for (index, chunk) in ids.chunks(chunk_size).enumerate() {
        let body = fetch_chunk(client, chunk, policy).await?;
        let records = parse_items(&body);
        info!(
            chunk = index + 1,
            of = chunk_count,
            requested = chunk.len(),
            parsed = records.len(),
            "Fetched game metadata"
        );
        for record in records {
            if let Some(id) = record.bgg_id {
                by_id.insert(id, record);
            }
        }

        tokio::time::sleep(policy.chunk_pause).await;
    }

    Ok(by_id)
}

/// GET one chunk until the body contains an `<item>` element, up to `max_attempts` times.
async fn fetch_chunk(client: &BggClient, chunk: &[u64], policy: &BatchPolicy) -> SyncResult<String> {
    let url = client.thing_url(chunk);
    let max = policy.max_attempts;

    for attempt in 1..=max {
        match client.get(&url).await {
            Ok(resp) if contains_item(&resp.body) => return Ok(resp.body),
            Ok(resp) => {
                warn!(
                    attempt,
                    max,
                    status = resp.status,
                    snippet = %resp.snippet(),
                    "thing response had no items"
                );
            }
            Err(e) if e.is_transient() => {
                warn!(attempt, max, error = %e, "thing request failed");
            }
            Err(e) => return Err(e),
        }
        wait_before_retry(policy.retry_delay, attempt, max).await;
    }

    Err(SyncError::NoItems {
        attempts: max,
        first: chunk.first().copied().unwrap_or_default(),
        len: chunk.len(),
    })
}
