//! Configuration loading and resolution.
//!
//! Every setting resolves as: explicit flag, then environment variable, then default.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// BoardGameGeek XML API 2 root.
pub const DEFAULT_API_BASE: &str = "https://boardgamegeek.com/xmlapi2";
pub const DEFAULT_MANIFEST: &str = "games.yaml";
pub const DEFAULT_OUTPUT: &str = "site/games.json";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const TOKEN_ENV: &str = "BGG_TOKEN";
pub const API_BASE_ENV: &str = "BGG_API_BASE";
pub const MANIFEST_ENV: &str = "SHELF_MANIFEST";
pub const OUTPUT_ENV: &str = "SHELF_OUTPUT";

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!(
    "boardgame-shelf/",
    env!("CARGO_PKG_VERSION"),
    " (personal project)"
);

/// How the `thing` endpoint is chunked and retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Ids per request.
    pub chunk_size: usize,
    /// Requests per chunk before the run fails.
    pub max_attempts: u32,
    /// Base of the linear backoff after a response without items.
    pub retry_delay: Duration,
    /// Pause after every chunk, successful or not.
    pub chunk_pause: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            chunk_size: 30,
            max_attempts: 5,
            retry_delay: Duration::from_millis(800),
            chunk_pause: Duration::from_millis(400),
        }
    }
}

/// How the `collection` endpoint is polled while BGG generates the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionPolicy {
    pub max_attempts: u32,
    /// Base of the linear backoff after a 202 Accepted.
    pub accepted_delay: Duration,
    /// Base of the linear backoff after any other unusable response.
    pub retry_delay: Duration,
}

impl Default for CollectionPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            accepted_delay: Duration::from_millis(2000),
            retry_delay: Duration::from_millis(1200),
        }
    }
}

/// Everything a pipeline run needs.
#[derive(Clone)]
pub struct SyncConfig {
    pub api_base: String,
    pub user_agent: String,
    pub token: Option<String>,
    pub manifest_path: PathBuf,
    pub output_path: PathBuf,
    pub request_timeout: Duration,
    /// Overall wall-clock limit for one pipeline run.
    pub deadline: Option<Duration>,
    pub batch: BatchPolicy,
    pub collection: CollectionPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
            token: None,
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            deadline: None,
            batch: BatchPolicy::default(),
            collection: CollectionPolicy::default(),
        }
    }
}

// The token never appears in logs.
impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("api_base", &self.api_base)
            .field("user_agent", &self.user_agent)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("manifest_path", &self.manifest_path)
            .field("output_path", &self.output_path)
            .field("request_timeout", &self.request_timeout)
            .field("deadline", &self.deadline)
            .field("batch", &self.batch)
            .field("collection", &self.collection)
            .finish()
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub manifest: Option<String>,
    pub output: Option<String>,
    pub timeout_secs: Option<u64>,
    pub deadline_secs: Option<u64>,
}

impl SyncConfig {
    /// Resolve a config from explicit values, the environment, and defaults.
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let defaults = Self::default();
        Self {
            api_base: resolve_setting(overrides.api_base, API_BASE_ENV)
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            token: resolve_setting(overrides.token, TOKEN_ENV),
            manifest_path: resolve_setting(overrides.manifest, MANIFEST_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.manifest_path),
            output_path: resolve_setting(overrides.output, OUTPUT_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            request_timeout: overrides
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            deadline: overrides.deadline_secs.map(Duration::from_secs),
            ..defaults
        }
    }
}

/// Resolve one setting: explicit value, else a non-blank environment variable.
pub fn resolve_setting(explicit: Option<String>, env_key: &str) -> Option<String> {
    if let Some(value) = explicit {
        return Some(value);
    }
    std::env::var(env_key)
        .ok()
        .filter(|v| !v.trim().is_empty())
}
