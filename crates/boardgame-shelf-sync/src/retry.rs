//! Linear backoff shared by the collection and `thing` fetchers.

use std::time::Duration;

/// Delay after the given 1-based attempt: `base * attempt`.
pub fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Sleep for the backoff after `attempt`, unless it was the last one.
pub async fn wait_before_retry(base: Duration, attempt: u32, max_attempts: u32) {
    if attempt < max_attempts {
        tokio::time::sleep(linear_backoff(base, attempt)).await;
    }
}

/// First characters of a response body with whitespace runs collapsed, for diagnostics.
pub fn body_snippet(body: &str, max_chars: usize) -> String {
    let head: String = body.chars().take(max_chars).collect();
    head.split_whitespace().collect::<Vec<_>>().join(" ")
}
