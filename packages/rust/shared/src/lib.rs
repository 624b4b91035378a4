//! Shared types, error model, and configuration for foliofetch.
//!
//! This crate is the foundation depended on by all other foliofetch crates.
//! It provides:
//! - [`FolioFetchError`] — the unified error type
//! - Domain types ([`ProjectSpec`], [`ItemOutcome`], [`PipelineSummary`])
//! - Configuration ([`SiteData`], [`GithubAuth`], data file loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{GithubAuth, SiteData, WriteupsSource, load_site_data};
pub use error::{FolioFetchError, Result};
pub use types::{ItemOutcome, ItemStatus, PipelineSummary, ProjectSpec};
