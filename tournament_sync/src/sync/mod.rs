//! Idempotent reconciliation of a tournament collection against a remote
//! scheduled-event feed.
//!
//! The synchronizer creates exactly one feed event per record not already
//! represented and leaves the rest untouched. Running it twice over
//! unchanged inputs creates nothing the second time. The matching policy is
//! read-then-write with no transactional guarantee, so callers must not run
//! two passes concurrently against the same feed.

pub mod errors;
pub mod models;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};

pub use errors::{FeedError, SyncError};
pub use models::{EventDraft, PublishedEvent, SyncEntry, SyncReport, SyncStatus};

use crate::ledger::DedupLedger;
use crate::retry::RetryPolicy;
use crate::tournament::models::TournamentCollection;

/// Upstream site host used to build event description links.
const DEFAULT_BASE_URL: &str = "https://www.start.gg";

/// Delay enforced between successive creation calls, for the feed's assumed
/// rate limit.
const DEFAULT_PUBLISH_DELAY: Duration = Duration::from_secs(1);

/// Remote scheduled-event feed, behind a trait so tests can substitute a
/// fake for the live platform.
#[async_trait]
pub trait EventFeed {
    /// List the feed's current scheduled events.
    async fn list_events(&self) -> Result<Vec<PublishedEvent>, FeedError>;

    /// Create one scheduled event, returning it with its assigned id.
    async fn create_event(&self, draft: &EventDraft) -> Result<PublishedEvent, FeedError>;
}

/// Policy deciding when a record counts as already published. Exactly one
/// policy applies to a synchronizer; the two are never merged.
///
/// `EventName` needs no storage but is vulnerable to upstream renames
/// (republishes) and to two tournaments sharing a name (false skip).
/// `Ledger` keys off the stable tournament id, at the cost of a durable
/// store whose entries accumulate until externally pruned.
pub enum MatchPolicy {
    /// Skip records whose name equals a listed event's name.
    EventName,
    /// Skip records whose id is present in the ledger.
    Ledger(Box<dyn DedupLedger + Send + Sync>),
}

/// Reconciles a tournament collection against a scheduled-event feed.
pub struct EventSynchronizer<F> {
    feed: F,
    policy: MatchPolicy,
    base_url: String,
    publish_delay: Duration,
    retry: RetryPolicy,
}

impl<F: EventFeed + Sync> EventSynchronizer<F> {
    pub fn new(feed: F, policy: MatchPolicy) -> Self {
        Self {
            feed,
            policy,
            base_url: DEFAULT_BASE_URL.to_string(),
            publish_delay: DEFAULT_PUBLISH_DELAY,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the host used in event description links.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Replace the delay between successive creation calls.
    pub fn with_publish_delay(mut self, delay: Duration) -> Self {
        self.publish_delay = delay;
        self
    }

    /// Replace the per-creation retry budget.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The feed this synchronizer publishes to.
    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Publish every record not already represented on the feed.
    ///
    /// A record that fails to publish is logged and marked failed without
    /// aborting the batch; only a failed feed listing or ledger read aborts
    /// the pass.
    pub async fn sync(&self, collection: &TournamentCollection) -> Result<SyncReport, SyncError> {
        let published_names: HashSet<String> = match &self.policy {
            MatchPolicy::EventName => self
                .feed
                .list_events()
                .await?
                .into_iter()
                .map(|event| event.name)
                .collect(),
            MatchPolicy::Ledger(_) => HashSet::new(),
        };

        let mut report = SyncReport::default();
        let mut attempted_create = false;
        for record in collection.records() {
            let already_published = match &self.policy {
                MatchPolicy::EventName => published_names.contains(&record.name),
                MatchPolicy::Ledger(ledger) => ledger.contains(record.id).await?,
            };
            if already_published {
                debug!("'{}' already published, skipping", record.name);
                report.push(record, SyncStatus::Skipped);
                continue;
            }

            if attempted_create {
                tokio::time::sleep(self.publish_delay).await;
            }
            attempted_create = true;

            let draft = EventDraft::for_record(record, &self.base_url);
            match self
                .retry
                .run("event creation", || self.feed.create_event(&draft))
                .await
            {
                Ok(event) => {
                    info!("published '{}' as feed event {}", record.name, event.id);
                    if let MatchPolicy::Ledger(ledger) = &self.policy {
                        // The event exists either way; a ledger write failure
                        // must not undo the publish.
                        if let Err(e) = ledger.record(record.id).await {
                            error!("failed to record tournament {} in ledger: {e}", record.id);
                        }
                    }
                    report.push(record, SyncStatus::Published);
                }
                Err(e) => {
                    error!("failed to publish '{}': {e}", record.name);
                    report.push(record, SyncStatus::Failed);
                }
            }
        }
        Ok(report)
    }
}
