//! Core domain types for foliofetch content ingestion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProjectSpec
// ---------------------------------------------------------------------------

/// A single `projects` entry from `data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Repository identifier, `owner/name`.
    pub url: String,

    /// Optional banner image source URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    /// Optional display-name override for the frontmatter title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProjectSpec {
    /// Filesystem-safe slug: the last path segment, lowercased.
    pub fn slug(&self) -> String {
        self.url
            .rsplit('/')
            .next()
            .unwrap_or(&self.url)
            .to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Per-item outcomes
// ---------------------------------------------------------------------------

/// Terminal status of one unit of work (one writeup entry, one project).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// The item's `index.md` was written.
    Processed,
    /// The item was skipped; the run continued.
    Skipped { reason: String },
}

/// Outcome of one unit of work, recorded for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// Item key (writeup folder name or project slug).
    pub item: String,
    /// What happened to it.
    pub status: ItemStatus,
}

/// Summary of a completed pipeline run.
///
/// Skips are first-class results here, not just interleaved log lines, so
/// "one item's failure never aborts the rest" is observable from the outside.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Pipeline name ("writeups" or "projects").
    pub pipeline: &'static str,
    /// Per-item outcomes in processing order.
    pub outcomes: Vec<ItemOutcome>,
    /// Total pipeline duration.
    pub duration: Duration,
}

impl PipelineSummary {
    /// Start an empty summary for the named pipeline.
    pub fn new(pipeline: &'static str) -> Self {
        Self {
            pipeline,
            outcomes: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Record a successfully processed item.
    pub fn record_processed(&mut self, item: impl Into<String>) {
        self.outcomes.push(ItemOutcome {
            item: item.into(),
            status: ItemStatus::Processed,
        });
    }

    /// Record a skipped item with its reason.
    pub fn record_skipped(&mut self, item: impl Into<String>, reason: impl Into<String>) {
        self.outcomes.push(ItemOutcome {
            item: item.into(),
            status: ItemStatus::Skipped {
                reason: reason.into(),
            },
        });
    }

    /// Number of items processed to completion.
    pub fn processed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ItemStatus::Processed)
            .count()
    }

    /// Number of items skipped.
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.processed()
    }

    /// Iterate over skipped items with their reasons.
    pub fn skips(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            ItemStatus::Skipped { reason } => Some((o.item.as_str(), reason.as_str())),
            ItemStatus::Processed => None,
        })
    }
}
