//! Wire-format types for the start.gg GraphQL boundary.

use serde::{Deserialize, Serialize};

use super::errors::FetchError;
use crate::tournament::models::{TournamentEvent, TournamentRecord};

#[derive(Debug, Serialize)]
pub(crate) struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    pub data: Option<TournamentsData>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TournamentsData {
    pub tournaments: Option<TournamentPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TournamentPage {
    #[serde(default)]
    pub nodes: Vec<TournamentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TournamentNode {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub start_at: i64,
    pub end_at: Option<i64>,
    pub addr_state: Option<String>,
    pub venue_address: Option<String>,
    pub owner: OwnerNode,
    #[serde(default)]
    pub events: Vec<EventNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerNode {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventNode {
    pub id: i64,
    pub videogame: VideogameNode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideogameNode {
    pub slug: String,
}

impl TournamentNode {
    /// Convert a wire node into a domain record. Some listings omit the end
    /// timestamp; those fall back to the start.
    pub(crate) fn into_record(self) -> Result<TournamentRecord, FetchError> {
        let start_at = chrono::DateTime::from_timestamp(self.start_at, 0).ok_or_else(|| {
            FetchError::Malformed(format!(
                "tournament {} carries invalid start timestamp {}",
                self.id, self.start_at
            ))
        })?;
        let end_secs = self.end_at.unwrap_or(self.start_at);
        let end_at = chrono::DateTime::from_timestamp(end_secs, 0).ok_or_else(|| {
            FetchError::Malformed(format!(
                "tournament {} carries invalid end timestamp {end_secs}",
                self.id
            ))
        })?;
        Ok(TournamentRecord {
            id: self.id,
            name: self.name,
            slug: self.slug,
            url: self.url,
            start_at,
            end_at,
            address_state: self.addr_state,
            venue_address: self.venue_address,
            owner_id: self.owner.id,
            events: self
                .events
                .into_iter()
                .map(|event| TournamentEvent {
                    event_id: event.id,
                    game_slug: event.videogame.slug,
                })
                .collect(),
        })
    }
}
