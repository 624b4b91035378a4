//! GitHub fetch primitive and typed API endpoints.
//!
//! Everything here degrades rather than fails: a non-2xx status, transport
//! error, timeout, or malformed response body yields `None` and a `warn!`
//! diagnostic. Callers treat `None` as "not available" and skip the affected
//! item — only client construction itself can return an error.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use foliofetch_shared::{FolioFetchError, GithubAuth, Result};

/// User-Agent string for all outgoing requests.
const USER_AGENT: &str = concat!("foliofetch/", env!("CARGO_PKG_VERSION"));

/// GitHub REST API media type, sent on API requests only.
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Request timeout. No retries — a timed-out fetch degrades the one item.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Production API base.
pub const API_BASE: &str = "https://api.github.com";

/// Production raw-content base.
pub const RAW_BASE: &str = "https://raw.githubusercontent.com";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Repository metadata from `GET /repos/{owner}/{repo}`.
///
/// Fields default when absent so a sparse response still parses.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoMetadata {
    /// Repository name as GitHub reports it.
    #[serde(default)]
    pub name: String,
    /// Description, `null` for repositories without one.
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical web URL.
    #[serde(default)]
    pub html_url: String,
    /// ISO 8601 last-updated timestamp.
    #[serde(default)]
    pub updated_at: String,
    /// Topic list.
    #[serde(default)]
    pub topics: Vec<String>,
}

/// One element of a `GET /repos/{owner}/{repo}/commits` response.
#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    #[serde(default)]
    date: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the GitHub API and raw-content host.
///
/// Base URLs are injectable so tests can point at a mock server.
pub struct GithubClient {
    http: Client,
    token: Option<String>,
    api_base: Url,
    raw_base: Url,
}

impl GithubClient {
    /// Create a client against the production GitHub endpoints.
    pub fn new(auth: &GithubAuth) -> Result<Self> {
        Self::with_bases(auth, API_BASE, RAW_BASE)
    }

    /// Create a client with explicit API and raw-content base URLs.
    pub fn with_bases(auth: &GithubAuth, api_base: &str, raw_base: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| FolioFetchError::Network(format!("failed to build HTTP client: {e}")))?;

        let api_base = Url::parse(api_base)
            .map_err(|e| FolioFetchError::config(format!("invalid API base '{api_base}': {e}")))?;
        let raw_base = Url::parse(raw_base)
            .map_err(|e| FolioFetchError::config(format!("invalid raw base '{raw_base}': {e}")))?;

        Ok(Self {
            http,
            token: auth.token.clone(),
            api_base,
            raw_base,
        })
    }

    /// Fetch a URL and decode the body as UTF-8 text.
    ///
    /// Sends the GitHub Accept header and, when configured, the token.
    /// Any failure is logged and collapsed to `None`.
    pub async fn fetch_text(&self, url: Url) -> Option<String> {
        debug!(%url, "fetching text");

        let mut request = self.http.get(url.clone()).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%url, error = %e, "fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "fetch returned non-success status");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(%url, error = %e, "failed to read response body");
                None
            }
        }
    }

    /// Fetch a URL as raw bytes (banner downloads).
    ///
    /// No API Accept header and no token — banner sources are arbitrary
    /// hosts, not the GitHub API.
    pub async fn fetch_bytes(&self, url: Url) -> Option<Vec<u8>> {
        debug!(%url, "fetching bytes");

        let response = match self.http.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%url, error = %e, "fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "fetch returned non-success status");
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!(%url, error = %e, "failed to read response body");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Typed endpoints
    // -----------------------------------------------------------------------

    /// ISO 8601 date of the most recent commit touching `folder`.
    ///
    /// Queries one commit, newest first. Malformed JSON, an empty result
    /// set, or a missing committer field all yield `None`.
    pub async fn latest_commit_date(
        &self,
        owner: &str,
        repo: &str,
        folder: &str,
    ) -> Option<String> {
        let mut url = self.endpoint(&format!("repos/{owner}/{repo}/commits"))?;
        url.query_pairs_mut()
            .append_pair("path", folder)
            .append_pair("page", "1")
            .append_pair("per_page", "1");

        let body = self.fetch_text(url).await?;

        let commits: Vec<CommitEntry> = match serde_json::from_str(&body) {
            Ok(c) => c,
            Err(e) => {
                warn!(owner, repo, folder, error = %e, "malformed commits response");
                return None;
            }
        };

        commits.into_iter().next()?.commit.committer?.date
    }

    /// Repository metadata for an `owner/name` identifier.
    pub async fn repo_metadata(&self, repo: &str) -> Option<RepoMetadata> {
        let url = self.endpoint(&format!("repos/{repo}"))?;
        let body = self.fetch_text(url).await?;

        match serde_json::from_str(&body) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!(repo, error = %e, "malformed repository metadata");
                None
            }
        }
    }

    /// Raw `README.md` of `repo` at `branch`.
    pub async fn readme(&self, repo: &str, branch: &str) -> Option<String> {
        let url = match self.raw_base.join(&format!("{repo}/{branch}/README.md")) {
            Ok(u) => u,
            Err(e) => {
                warn!(repo, branch, error = %e, "invalid raw-content URL");
                return None;
            }
        };
        self.fetch_text(url).await
    }

    /// Build an API URL relative to the configured base.
    fn endpoint(&self, path: &str) -> Option<Url> {
        match self.api_base.join(path) {
            Ok(u) => Some(u),
            Err(e) => {
                warn!(path, error = %e, "invalid API URL");
                None
            }
        }
    }
}
