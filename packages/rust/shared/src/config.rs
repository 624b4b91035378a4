//! Site data and run configuration for foliofetch.
//!
//! The declarative input lives in `data.json` at the site root. CLI flags
//! pick the file path and the content root; the GitHub token comes from the
//! environment once at startup and is passed by value from there on — no
//! ambient global.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FolioFetchError, Result};
use crate::types::ProjectSpec;

/// Environment variable holding the optional GitHub access token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

// ---------------------------------------------------------------------------
// Site data (matching data.json schema)
// ---------------------------------------------------------------------------

/// Top-level site data, deserialized from `data.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteData {
    /// Projects to ingest, in emission order.
    #[serde(default)]
    pub projects: Vec<ProjectSpec>,

    /// Source repository for the writeups pipeline.
    #[serde(default)]
    pub writeups: WriteupsSource,
}

/// `writeups` section — which repository the writeups pipeline clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteupsSource {
    /// Repository owner. Also used for the commits-API lookups.
    #[serde(default = "default_writeups_owner")]
    pub owner: String,

    /// Repository name.
    #[serde(default = "default_writeups_repo")]
    pub repo: String,

    /// Clone source override. When unset, the GitHub HTTPS URL for
    /// `owner/repo` is used. Accepts anything `git clone` does, so a
    /// mirror or a local path can stand in for the hosted repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

impl Default for WriteupsSource {
    fn default() -> Self {
        Self {
            owner: default_writeups_owner(),
            repo: default_writeups_repo(),
            remote: None,
        }
    }
}

impl WriteupsSource {
    /// Clone URL for the writeups repository.
    pub fn clone_url(&self) -> String {
        self.remote
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{}/{}.git", self.owner, self.repo))
    }
}

fn default_writeups_owner() -> String {
    "ViegPhunt".into()
}
fn default_writeups_repo() -> String {
    "CTF-WriteUps".into()
}

// ---------------------------------------------------------------------------
// Data loading
// ---------------------------------------------------------------------------

/// Load site data from a JSON file.
///
/// Unlike per-item fetch failures, an unreadable or malformed data file is
/// fatal: the whole run is meaningless without it.
pub fn load_site_data(path: &Path) -> Result<SiteData> {
    let content = std::fs::read_to_string(path).map_err(|e| FolioFetchError::io(path, e))?;

    serde_json::from_str(&content).map_err(|e| {
        FolioFetchError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

// ---------------------------------------------------------------------------
// GitHub auth
// ---------------------------------------------------------------------------

/// Optional GitHub token, resolved from the environment once at startup.
#[derive(Debug, Clone, Default)]
pub struct GithubAuth {
    /// Access token, if configured. Attached as `Authorization: token <t>`.
    pub token: Option<String>,
}

impl GithubAuth {
    /// Read the token from `GITHUB_TOKEN`. Empty values count as unset.
    pub fn from_env() -> Self {
        let token = std::env::var(GITHUB_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty());

        if token.is_none() {
            tracing::debug!("no GitHub token configured, requests are unauthenticated");
        }

        Self { token }
    }
}
