//! Event-feed and synchronizer error types.

use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors from the remote scheduled-event feed.
///
/// On the create path these stay per-record: the failing record is marked
/// failed and the batch continues.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport-level failure
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed replied with a non-success status
    #[error("feed returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response parsed but did not carry the expected shape
    #[error("malformed feed response: {0}")]
    Malformed(String),
}

/// Errors that abort a whole synchronizer pass before or between records.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The published-event listing could not be read
    #[error("failed to list published events: {0}")]
    Feed(#[from] FeedError),

    /// The dedup ledger could not be consulted
    #[error("dedup ledger failed: {0}")]
    Ledger(#[from] LedgerError),
}
