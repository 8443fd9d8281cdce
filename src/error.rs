//! Typed errors for the fetch, filter and preference layers.
//!
//! The CLI wraps these in `anyhow` with context; the library keeps them typed so
//! callers can tell a cancelled request from a failed one.

use thiserror::Error;

/// Failure modes of a single fetch against the World Bank API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("request failed with HTTP {status}")]
    Network { status: u16 },
    /// Connection, TLS or timeout failure before a status was received.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The body was not valid JSON.
    #[error("decode json: {0}")]
    Decode(#[from] serde_json::Error),
    /// The request was superseded or aborted by its caller.
    #[error("request cancelled")]
    Cancelled,
    /// Pagination ran past the configured page cap.
    #[error("page limit exceeded ({0})")]
    PageLimit(u32),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Invalid user input for the filter criteria.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid year {0:?}, expected YYYY")]
    InvalidYear(String),
}

/// Failure to persist the preference file.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("no config directory available")]
    NoConfigDir,
    #[error("failed to write preferences to {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}
