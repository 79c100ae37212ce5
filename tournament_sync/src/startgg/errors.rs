//! Remote fetch error types.

use thiserror::Error;

use crate::errors::ConfigError;

/// Errors that abort a whole paginated fetch. A failed fetch never yields a
/// partial, silently-truncated collection.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Selector or window rejected before any network call
    #[error("invalid query: {0}")]
    Config(#[from] ConfigError),

    /// Transport-level failure
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream replied with a non-success status
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Upstream reported a query-level error in an otherwise valid response
    #[error("upstream rejected query: {0}")]
    Api(String),

    /// Response parsed but did not carry the expected shape
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    /// A page fetch kept failing past the retry budget
    #[error("page fetch failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}
