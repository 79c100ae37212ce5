//! Selector and window validation error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised before any network call when a query or filter is
/// misconfigured.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A selector that must pick something was empty or absent
    #[error("{what} must be non-empty")]
    EmptySelector { what: &'static str },

    /// A time window whose start does not precede its end
    #[error("time window start {start} must be before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
