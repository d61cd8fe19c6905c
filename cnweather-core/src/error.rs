use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to load the reference tables. Always fatal for the process.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read reference data file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Reference data file {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid entry '{key}' in {}: {reason}", path.display())]
    InvalidEntry { path: PathBuf, key: String, reason: String },
}

/// Per-call adapter failure. Logged and turned into a miss by the adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no data for '{0}'")]
    NotFound(String),
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
