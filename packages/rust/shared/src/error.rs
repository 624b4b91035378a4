//! Error types for foliofetch.
//!
//! Library crates use [`FolioFetchError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.
//!
//! The error model mirrors the run's two-tier failure taxonomy: only config
//! loading, the writeups clone, and local I/O surface as `Err` — every
//! network or parse failure degrades to "not available" inside the crate
//! that observed it.

use std::path::PathBuf;

/// Top-level error type for all foliofetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FolioFetchError {
    /// Site data loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error (client construction, endpoint URL building).
    #[error("network error: {0}")]
    Network(String),

    /// `git` subprocess failure during the writeups clone.
    #[error("vcs error: {0}")]
    Vcs(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Banner image decode/encode error.
    #[error("image error: {0}")]
    Image(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioFetchError>;

impl FolioFetchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
