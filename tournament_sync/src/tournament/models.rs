//! Tournament data models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Upstream tournament id, stable across runs.
pub type TournamentId = i64;

/// Upstream organizer id.
pub type OwnerId = i64;

/// Half-open time window `[start, end)` bounding a tournament query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, rejecting one whose start does not precede its end.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ConfigError> {
        if start >= end {
            return Err(ConfigError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window covering the next `days` days from now.
    pub fn next_days(days: i64) -> Result<Self, ConfigError> {
        let start = Utc::now();
        Self::new(start, start + Duration::days(days))
    }

    /// Whether an instant falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// One game-specific event hosted by a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentEvent {
    pub event_id: i64,
    /// Upstream game slug, e.g. `game/street-fighter-6`.
    pub game_slug: String,
}

/// One remote tournament as returned by the upstream API.
///
/// Records are built by the gateway and never mutated field-by-field
/// afterwards; filters drop whole records instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub id: TournamentId,
    pub name: String,
    pub slug: String,
    /// URL path fragment on the upstream site, used to link published events.
    pub url: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub start_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub end_at: DateTime<Utc>,
    /// Two-letter US state code, when the upstream listing carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_address: Option<String>,
    pub owner_id: OwnerId,
    /// Non-empty for any record the upstream API returns (assumed, not
    /// independently validated).
    pub events: Vec<TournamentEvent>,
}

impl TournamentRecord {
    /// Whether any hosted event runs one of the given games.
    pub fn hosts_any_game(&self, games: &[String]) -> bool {
        self.events
            .iter()
            .any(|event| games.iter().any(|game| game == &event.game_slug))
    }
}

/// Ordered collection of tournaments, owned by a single pull/filter/sync run.
///
/// Filters are pure: each returns a new order-preserving subsequence and
/// leaves its input untouched, so chained filters intersect regardless of
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentCollection {
    records: Vec<TournamentRecord>,
}

impl TournamentCollection {
    pub fn new(records: Vec<TournamentRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TournamentRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TournamentRecord> {
        self.records
    }

    /// Retain records hosting at least one event for a game in `games`.
    pub fn filter_by_game(&self, games: &[String]) -> Result<Self, ConfigError> {
        if games.is_empty() {
            return Err(ConfigError::EmptySelector { what: "game list" });
        }
        Ok(self.retained(|record| record.hosts_any_game(games)))
    }

    /// Retain records organized by one of the given owners.
    pub fn filter_by_owner(&self, owners: &[OwnerId]) -> Result<Self, ConfigError> {
        if owners.is_empty() {
            return Err(ConfigError::EmptySelector { what: "owner list" });
        }
        Ok(self.retained(|record| owners.contains(&record.owner_id)))
    }

    /// Retain records whose state code equals `state` exactly.
    /// Case-sensitive, no normalization.
    pub fn filter_by_state(&self, state: &str) -> Result<Self, ConfigError> {
        if state.is_empty() {
            return Err(ConfigError::EmptySelector { what: "state" });
        }
        Ok(self.retained(|record| record.address_state.as_deref() == Some(state)))
    }

    fn retained(&self, keep: impl Fn(&TournamentRecord) -> bool) -> Self {
        Self::new(self.records.iter().filter(|r| keep(r)).cloned().collect())
    }
}

impl From<Vec<TournamentRecord>> for TournamentCollection {
    fn from(records: Vec<TournamentRecord>) -> Self {
        Self::new(records)
    }
}
