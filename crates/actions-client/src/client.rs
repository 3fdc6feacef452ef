//! GitHub Actions REST client
//!
//! Talks to the workflow-run listing, single-run and log-archive endpoints.
//! Every request carries the bearer token, the versioned-API headers and a
//! fixed timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::ActionsApi;
use crate::error::ClientError;
use crate::run::{ApiRun, ApiRunList, RunId, WorkflowRun};
use crate::Result;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned via `X-GitHub-Api-Version`.
pub const API_VERSION: &str = "2022-11-28";

/// Deadline applied to every outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

/// Actions API client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL (GitHub Enterprise installs use `https://host/api/v3`)
    pub base_url: String,
    /// Bearer token
    pub token: String,
    /// Per-request deadline
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Create config for the public API with the given token
    pub fn new(token: &str) -> Self {
        ClientConfig {
            base_url: DEFAULT_API_URL.to_string(),
            token: token.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("ci-triage/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Create config from `GITHUB_TOKEN` and `GITHUB_API_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = var("GITHUB_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ClientError::MissingToken)?;
        let mut config = Self::new(&token);
        if let Some(base_url) = var("GITHUB_API_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Override the per-request deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// reqwest-backed implementation of [`ActionsApi`]
pub struct GitHubActionsClient {
    config: ClientConfig,
    base_url: Url,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for GitHubActionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubActionsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GitHubActionsClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(ClientError::MissingToken);
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(GitHubActionsClient {
            config,
            base_url,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build `{base}/repos/{owner}/{repo}/actions/runs/{tail..}`.
    ///
    /// Each identifier is pushed as its own path segment, so it is
    /// percent-encoded. Empty, `.` and `..` are rejected because the URL
    /// parser would collapse them instead of encoding them.
    fn runs_url(&self, owner: &str, repo: &str, tail: &[&str]) -> Result<Url> {
        for ident in [owner, repo] {
            check_identifier(ident)?;
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(["repos", owner, repo, "actions", "runs"])
            .extend(tail);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        debug!(url = %url, "GET");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Actions API returned an error");
        Err(ClientError::transport(Some(status.as_u16()), body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.get(url).await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::transport(Some(status), format!("invalid JSON payload: {}", e))
        })
    }
}

fn check_identifier(ident: &str) -> Result<()> {
    match ident {
        "" | "." | ".." => Err(ClientError::InvalidIdentifier(ident.to_string())),
        _ => Ok(()),
    }
}

#[async_trait]
impl ActionsApi for GitHubActionsClient {
    async fn list_failed_runs(
        &self,
        owner: &str,
        repo: &str,
        count: u32,
    ) -> Result<Vec<WorkflowRun>> {
        let mut url = self.runs_url(owner, repo, &[])?;
        url.query_pairs_mut()
            .append_pair("status", "failure")
            .append_pair("per_page", &count.to_string());

        let listing: ApiRunList = self.get_json(url).await?;
        let mut runs: Vec<WorkflowRun> = listing
            .workflow_runs
            .into_iter()
            .map(WorkflowRun::from)
            .collect();
        // Stable: runs created in the same second keep the API's order.
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        runs.truncate(count as usize);

        info!(owner, repo, found = runs.len(), requested = count, "Listed failed runs");
        Ok(runs)
    }

    async fn get_run(&self, owner: &str, repo: &str, id: RunId) -> Result<WorkflowRun> {
        let url = self.runs_url(owner, repo, &[&id.to_string()])?;
        let raw: ApiRun = self.get_json(url).await?;
        Ok(raw.into())
    }

    async fn get_log_archive(&self, owner: &str, repo: &str, id: RunId) -> Result<Vec<u8>> {
        let url = self.runs_url(owner, repo, &[&id.to_string(), "logs"])?;
        let response = self.get(url).await?;
        let bytes = response.bytes().await?;
        info!(run_id = %id, bytes = bytes.len(), "Downloaded log archive");
        Ok(bytes.to_vec())
    }
}
