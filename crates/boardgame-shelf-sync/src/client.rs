//! Async HTTP client for the BoardGameGeek XML API 2, wrapping reqwest.
//!
//! One GET per call, no retries of its own; the fetchers own the retry
//! policy because each endpoint signals "try again" differently.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::retry::body_snippet;

/// `Accept` header for XML endpoints.
pub const XML_ACCEPT: &str = "application/xml,text/xml;q=0.9,*/*;q=0.8";

/// Characters of a body kept in diagnostics.
pub const SNIPPET_CHARS: usize = 120;

/// Response from a GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Start of the body for log lines and error messages.
    pub fn snippet(&self) -> String {
        body_snippet(&self.body, SNIPPET_CHARS)
    }
}

/// Client bound to one API base URL and optional bearer token.
#[derive(Clone)]
pub struct BggClient {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl BggClient {
    /// Build a client from the run's configuration.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `collection` URL for a user's owned base games, expansions excluded.
    ///
    /// BGG can return expansions even with `subtype=boardgame`, hence the explicit exclusion.
    pub fn collection_url(&self, username: &str) -> String {
        let user: String = url::form_urlencoded::byte_serialize(username.as_bytes()).collect();
        format!(
            "{}/collection?username={user}&own=1&subtype=boardgame&excludesubtype=boardgameexpansion",
            self.api_base
        )
    }

    /// `thing` URL for a batch of ids, with statistics.
    pub fn thing_url(&self, ids: &[u64]) -> String {
        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}/thing?id={joined}&stats=1", self.api_base)
    }

    /// Perform a single GET. Any HTTP status is returned as a response; only transport failures are errors.
    pub async fn get(&self, url: &str) -> SyncResult<HttpResponse> {
        tracing::debug!(url, "GET");
        let mut req = self.client.get(url).header(reqwest::header::ACCEPT, XML_ACCEPT);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        Ok(HttpResponse { status, body })
    }
}
