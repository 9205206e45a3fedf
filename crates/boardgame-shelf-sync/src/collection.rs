//! Owned-game ids from a BGG user's collection.
//!
//! BGG builds collection exports asynchronously: the first request often
//! answers 202 Accepted and the caller is expected to poll until the XML is
//! ready.

use boardgame_shelf::{collection_ids, collection_total};
use tracing::{info, warn};

use crate::client::BggClient;
use crate::config::CollectionPolicy;
use crate::error::{SyncError, SyncResult};
use crate::retry::{linear_backoff, wait_before_retry};

/// Fetch the ids of every base game `username` owns, deduplicated and ascending.
///
/// An empty collection is a valid result and only logs a warning.
pub async fn fetch_collection(
    client: &BggClient,
    username: &str,
    policy: &CollectionPolicy,
) -> SyncResult<Vec<u64>> {
    let body = fetch_collection_xml(client, username, policy).await?;
    let ids = collection_ids(&body);

    if ids.is_empty() {
        let total = collection_total(&body)
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        warn!(
            username,
            total = %total,
            "No objectid items found. Is the collection public and filtered correctly?"
        );
    } else {
        info!(username, games = ids.len(), "Collection fetched");
    }

    Ok(ids)
}

async fn fetch_collection_xml(
    client: &BggClient,
    username: &str,
    policy: &CollectionPolicy,
) -> SyncResult<String> {
    if client.token().is_none() {
        return Err(SyncError::MissingToken);
    }
    let url = client.collection_url(username);
    let max = policy.max_attempts;

    for attempt in 1..=max {
        let resp = match client.get(&url).await {
            Ok(resp) => resp,
            Err(e) if e.is_transient() => {
                warn!(attempt, max, error = %e, "Collection request failed");
                wait_before_retry(policy.retry_delay, attempt, max).await;
                continue;
            }
            Err(e) => return Err(e),
        };

        match resp.status {
            202 => {
                info!(
                    attempt,
                    max,
                    wait_ms = linear_backoff(policy.accepted_delay, attempt).as_millis() as u64,
                    "Collection is still being generated"
                );
                wait_before_retry(policy.accepted_delay, attempt, max).await;
            }
            401 => {
                return Err(SyncError::Unauthorized {
                    snippet: resp.snippet(),
                });
            }
            // `<items total="0">` is a usable, empty answer.
            _ if resp.body.contains("<items") => return Ok(resp.body),
            status => {
                warn!(
                    attempt,
                    max,
                    status,
                    snippet = %resp.snippet(),
                    "Unexpected collection response"
                );
                wait_before_retry(policy.retry_delay, attempt, max).await;
            }
        }
    }

    Err(SyncError::CollectionUnavailable { attempts: max })
}
