//! Error types for remote service calls.

use thiserror::Error;

/// Error type for calls to the metadata service or the analysis engine.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network request failed (connection, timeout, TLS, ...).
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(reqwest::StatusCode),

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// Failed to build the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuildError(String),
}
