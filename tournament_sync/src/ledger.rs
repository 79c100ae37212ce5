//! Durable dedup ledger mapping tournament ids to published status.
//!
//! Used by the ledger matching policy to keep publishes idempotent across
//! runs. Entries never expire; pruning is an external concern.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use thiserror::Error;

use crate::export::write_atomic;
use crate::tournament::models::TournamentId;

/// Ledger error types.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("ledger (de)serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable record of which tournaments have been published.
///
/// Append-only from the synchronizer: ids are added on publish and read for
/// existence checks, never removed.
#[async_trait]
pub trait DedupLedger {
    /// Whether the tournament was already published in some earlier run.
    async fn contains(&self, id: TournamentId) -> Result<bool, LedgerError>;

    /// Durably mark the tournament as published.
    async fn record(&self, id: TournamentId) -> Result<(), LedgerError>;
}

#[async_trait]
impl<L: DedupLedger + Send + Sync> DedupLedger for Arc<L> {
    async fn contains(&self, id: TournamentId) -> Result<bool, LedgerError> {
        self.as_ref().contains(id).await
    }

    async fn record(&self, id: TournamentId) -> Result<(), LedgerError> {
        self.as_ref().record(id).await
    }
}

/// File-backed ledger holding a JSON array of published tournament ids.
pub struct FileLedger {
    path: PathBuf,
    ids: Mutex<BTreeSet<TournamentId>>,
}

impl FileLedger {
    /// Open the ledger at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let ids = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            ids: Mutex::new(ids),
        })
    }

    fn lock_ids(&self) -> MutexGuard<'_, BTreeSet<TournamentId>> {
        self.ids.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, ids: &BTreeSet<TournamentId>) -> Result<(), LedgerError> {
        let json = serde_json::to_vec_pretty(ids)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}

#[async_trait]
impl DedupLedger for FileLedger {
    async fn contains(&self, id: TournamentId) -> Result<bool, LedgerError> {
        Ok(self.lock_ids().contains(&id))
    }

    async fn record(&self, id: TournamentId) -> Result<(), LedgerError> {
        let mut ids = self.lock_ids();
        if ids.insert(id) {
            self.persist(&ids)?;
        }
        Ok(())
    }
}

/// In-memory ledger for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    ids: Mutex<BTreeSet<TournamentId>>,
}

#[async_trait]
impl DedupLedger for MemoryLedger {
    async fn contains(&self, id: TournamentId) -> Result<bool, LedgerError> {
        Ok(self
            .ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id))
    }

    async fn record(&self, id: TournamentId) -> Result<(), LedgerError> {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id);
        Ok(())
    }
}
