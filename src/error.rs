//! Error types for the library. Binaries wrap these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// A payload does not have the shape its consumer expects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("key '{0}' holds a nested object instead of a translation value")]
    NestedObject(String),

    #[error("namespace '{namespace}' is invalid: {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Fatal failures of an offline splitter run.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("failed to read source file {}: {source}", .path.display())]
    ReadSource {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse source file {}: {source}", .path.display())]
    ParseSource {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("source file {} defines key '{key}' more than once", .path.display())]
    KeyCollision { path: PathBuf, key: String },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove stale file {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures reading the translation store. A missing file is not one of them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unexpected content in {}: {source}", .path.display())]
    Schema { path: PathBuf, source: SchemaError },
}

/// Failures fetching translations from the service.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid payload from {url}: {source}")]
    Schema { url: String, source: SchemaError },
}

impl LoadError {
    /// Network errors, 5xx and 429 are worth another attempt; everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LoadError::Request { .. } => true,
            LoadError::Status { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            LoadError::Schema { .. } => false,
        }
    }
}
