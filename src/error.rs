//! Error handling types and utilities.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for setup and binary-level operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` at the call sites. The search path itself never returns it.
pub type Result<T> = anyhow::Result<T>;

/// Error returned by a [`Catalog`](crate::catalog::Catalog) implementation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing file could not be read or written.
    #[error("catalog I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backing file did not contain a valid record list.
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The store is unusable (poisoned lock, lost connection, ...).
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Error returned by a [`MetadataProvider`](crate::provider::MetadataProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("provider call timed out after {0} ms")]
    Timeout(u64),
    #[error("no provider endpoint configured")]
    NotConfigured,
}

/// Error produced while loading or validating [`SearchConfig`](crate::config::SearchConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Error produced when the embedded franchise data fails to load.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to parse franchise data: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unsupported franchise data version {0}")]
    Version(u32),
    #[error("invalid franchise data for `{franchise}`: {reason}")]
    Invalid { franchise: String, reason: String },
}

/// Error returned when an import request cannot be queued.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("import queue is full")]
    QueueFull,
    #[error("import queue is closed")]
    QueueClosed,
}
