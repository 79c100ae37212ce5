//! # Tournament Sync
//!
//! Pulls tournament listings from the start.gg GraphQL API, filters them by
//! region, game, or organizer, and mirrors the filtered set into a Discord
//! guild's scheduled events without creating duplicates across runs.
//!
//! ## Core Modules
//!
//! - [`tournament`]: tournament records, collections, and the pull/filter facade
//! - [`startgg`]: paginated query gateway for the upstream tournament API
//! - [`sync`]: idempotent reconciliation against the scheduled-event feed
//! - [`discord`]: scheduled-event feed client for a Discord guild
//! - [`ledger`]: durable dedup ledger for cross-run publish tracking
//! - [`export`]: JSON export of a collection for inspection
//!
//! ## Example
//!
//! ```no_run
//! use tournament_sync::{StartggClient, TimeWindow, TournamentPuller};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = StartggClient::new("api-key".into());
//! let window = TimeWindow::next_days(30)?;
//! let mut puller = TournamentPuller::new(source, window).with_state("NC".into());
//! puller.initiate_by_state(None).await?;
//! puller.filter_by_game(Some(&["game/street-fighter-6".into()]))?;
//! # Ok(())
//! # }
//! ```

/// Scheduled-event feed client for Discord guilds.
pub mod discord;
/// Selector and window validation errors.
pub mod errors;
/// Collection export to durable storage.
pub mod export;
/// Durable dedup ledger.
pub mod ledger;
/// Bounded retry combinator shared by the fetch and publish paths.
pub mod retry;
/// Remote query gateway for the start.gg API.
pub mod startgg;
/// Event synchronizer and feed boundary types.
pub mod sync;
/// Tournament domain models and the pull/filter facade.
pub mod tournament;

pub use discord::DiscordClient;
pub use errors::ConfigError;
pub use export::{ExportError, export_collection};
pub use ledger::{DedupLedger, FileLedger, LedgerError, MemoryLedger};
pub use retry::RetryPolicy;
pub use startgg::{FetchError, StartggClient, TournamentSource};
pub use sync::{
    EventDraft, EventFeed, EventSynchronizer, FeedError, MatchPolicy, PublishedEvent, SyncError,
    SyncReport, SyncStatus,
};
pub use tournament::{
    OwnerId, TimeWindow, TournamentCollection, TournamentEvent, TournamentId, TournamentPuller,
    TournamentRecord,
};
