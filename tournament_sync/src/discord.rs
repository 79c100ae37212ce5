//! Discord guild scheduled-events client.
//!
//! Implements [`EventFeed`] over the guild scheduled-events REST resource:
//! one list call per synchronizer pass plus one create call per missing
//! tournament.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::{EventDraft, EventFeed, FeedError, PublishedEvent};

const API_BASE: &str = "https://discord.com/api/v10";

/// Guild-only privacy level.
const PRIVACY_GUILD_ONLY: u8 = 2;

/// External entity type: the event happens outside any voice channel, so it
/// carries an end time and a free-text location.
const ENTITY_EXTERNAL: u8 = 3;

/// Client for one guild's scheduled-event feed.
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    guild_id: u64,
}

#[derive(Debug, Serialize)]
struct CreateEventRequest<'a> {
    name: &'a str,
    description: &'a str,
    privacy_level: u8,
    entity_type: u8,
    entity_metadata: EntityMetadata<'a>,
    scheduled_start_time: String,
    scheduled_end_time: String,
}

#[derive(Debug, Serialize)]
struct EntityMetadata<'a> {
    location: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScheduledEvent {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    entity_metadata: Option<EntityMetadataResponse>,
    scheduled_start_time: DateTime<Utc>,
    #[serde(default)]
    scheduled_end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct EntityMetadataResponse {
    #[serde(default)]
    location: Option<String>,
}

impl From<ScheduledEvent> for PublishedEvent {
    fn from(event: ScheduledEvent) -> Self {
        let end_at = event.scheduled_end_time.unwrap_or(event.scheduled_start_time);
        Self {
            id: event.id,
            name: event.name,
            description: event.description.unwrap_or_default(),
            location: event
                .entity_metadata
                .and_then(|meta| meta.location)
                .unwrap_or_default(),
            start_at: event.scheduled_start_time,
            end_at,
        }
    }
}

impl DiscordClient {
    /// Create a client for the given guild against the live Discord API.
    pub fn new(token: String, guild_id: u64) -> Self {
        Self::with_api_base(token, guild_id, API_BASE.to_string())
    }

    /// Create a client against a custom API base (local test servers).
    pub fn with_api_base(token: String, guild_id: u64, api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            token,
            guild_id,
        }
    }

    fn events_url(&self) -> String {
        format!(
            "{}/guilds/{}/scheduled-events",
            self.api_base, self.guild_id
        )
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }
}

#[async_trait::async_trait]
impl EventFeed for DiscordClient {
    async fn list_events(&self) -> Result<Vec<PublishedEvent>, FeedError> {
        let response = self
            .http
            .get(self.events_url())
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let events: Vec<ScheduledEvent> = response.json().await?;
        Ok(events.into_iter().map(PublishedEvent::from).collect())
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<PublishedEvent, FeedError> {
        // Discord expects ISO 8601; publish in the local observer's zone.
        let request = CreateEventRequest {
            name: &draft.name,
            description: &draft.description,
            privacy_level: PRIVACY_GUILD_ONLY,
            entity_type: ENTITY_EXTERNAL,
            entity_metadata: EntityMetadata {
                location: &draft.location,
            },
            scheduled_start_time: draft.start_at.with_timezone(&Local).to_rfc3339(),
            scheduled_end_time: draft.end_at.with_timezone(&Local).to_rfc3339(),
        };

        let response = self
            .http
            .post(self.events_url())
            .header("Authorization", self.auth_header())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let event: ScheduledEvent = response.json().await?;
        Ok(event.into())
    }
}
