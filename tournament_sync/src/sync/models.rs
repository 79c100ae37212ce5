//! Data models for the scheduled-event feed boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tournament::models::{TournamentId, TournamentRecord};

/// A calendar entry already present on the remote feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedEvent {
    /// Platform-assigned identifier.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Payload for one scheduled-event creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl EventDraft {
    /// Build the event payload for one tournament record: display name from
    /// the record, description linking back to the upstream page, venue
    /// address (or empty) as the location.
    pub fn for_record(record: &TournamentRecord, base_url: &str) -> Self {
        Self {
            name: record.name.clone(),
            description: format!("{base_url}{}", record.url),
            location: record.venue_address.clone().unwrap_or_default(),
            start_at: record.start_at,
            end_at: record.end_at,
        }
    }
}

/// Final disposition of one record in a synchronizer pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// Already represented on the feed; left untouched.
    Skipped,
    /// A feed event was created for this record.
    Published,
    /// Creation failed; logged, the batch continued.
    Failed,
}

/// One record's final disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    pub tournament_id: TournamentId,
    pub name: String,
    pub status: SyncStatus,
}

/// Outcome of one synchronizer pass over a collection.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    pub(crate) fn push(&mut self, record: &TournamentRecord, status: SyncStatus) {
        self.entries.push(SyncEntry {
            tournament_id: record.id,
            name: record.name.clone(),
            status,
        });
    }

    fn count(&self, status: SyncStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn published(&self) -> usize {
        self.count(SyncStatus::Published)
    }

    pub fn skipped(&self) -> usize {
        self.count(SyncStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(SyncStatus::Failed)
    }

    /// One-line status for the triggering interaction.
    pub fn summary(&self) -> String {
        match (self.published(), self.failed()) {
            (0, 0) => "no new events".to_string(),
            (published, 0) => format!("{published} events published"),
            (published, failed) => {
                format!("{published} events published, {failed} failed")
            }
        }
    }
}
