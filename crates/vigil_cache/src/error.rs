//! Cache error types.

use thiserror::Error;
use vigil_registry::FetchError;

/// Reasons a workspace refresh could not produce a cache entry.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The workspace has no usable `vigil.yml`.
    #[error("No usable configuration")]
    EmptyConfig,

    /// The configuration file's metadata could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The metadata service could not resolve a timestamp.
    #[error("Rule set timestamp unavailable")]
    UnknownTimestamp,

    /// A remote call failed.
    #[error("Remote error: {0}")]
    Fetch(#[from] FetchError),
}
