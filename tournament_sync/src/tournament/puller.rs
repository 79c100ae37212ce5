//! Pull/filter facade with stored query defaults.
//!
//! A puller holds one gateway plus optional default selectors. Every
//! operation resolves its selector once, at the call boundary, with a single
//! precedence rule: explicit argument, then stored default, then failure.
//! Empty selectors are rejected by the underlying gateway and filters, never
//! treated as "match everything".

use std::path::Path;

use crate::errors::ConfigError;
use crate::export::{self, ExportError};
use crate::startgg::{FetchError, TournamentSource};
use crate::tournament::models::{OwnerId, TimeWindow, TournamentCollection};

/// Stateful facade over one pull-filter-export run.
pub struct TournamentPuller<S> {
    source: S,
    window: TimeWindow,
    games: Option<Vec<String>>,
    owners: Option<Vec<OwnerId>>,
    state: Option<String>,
    collection: TournamentCollection,
}

impl<S: TournamentSource + Sync> TournamentPuller<S> {
    /// Create a puller over `source` with no stored selector defaults.
    pub fn new(source: S, window: TimeWindow) -> Self {
        Self {
            source,
            window,
            games: None,
            owners: None,
            state: None,
            collection: TournamentCollection::default(),
        }
    }

    /// Store a default game list for later filter calls.
    pub fn with_games(mut self, games: Vec<String>) -> Self {
        self.games = Some(games);
        self
    }

    /// Store a default owner list for later fetch and filter calls.
    pub fn with_owners(mut self, owners: Vec<OwnerId>) -> Self {
        self.owners = Some(owners);
        self
    }

    /// Store a default state code for later fetch and filter calls.
    pub fn with_state(mut self, state: String) -> Self {
        self.state = Some(state);
        self
    }

    /// The collection built by the most recent fetch, as narrowed by any
    /// filters applied since.
    pub fn collection(&self) -> &TournamentCollection {
        &self.collection
    }

    /// Consume the puller, yielding the final collection.
    pub fn into_collection(self) -> TournamentCollection {
        self.collection
    }

    /// Replace the collection with tournaments held in the given state.
    pub async fn initiate_by_state(&mut self, state: Option<&str>) -> Result<(), FetchError> {
        let state = resolve(state, self.state.as_deref(), "state")?;
        self.collection = self
            .source
            .tournaments_by_state(state, &self.window)
            .await?
            .into();
        Ok(())
    }

    /// Replace the collection with tournaments run by the given owners.
    pub async fn initiate_by_owners(
        &mut self,
        owners: Option<&[OwnerId]>,
    ) -> Result<(), FetchError> {
        let owners = resolve(owners, self.owners.as_deref(), "owner list")?;
        self.collection = self
            .source
            .tournaments_by_owners(owners, &self.window)
            .await?
            .into();
        Ok(())
    }

    /// Narrow the collection to tournaments hosting one of the given games.
    pub fn filter_by_game(&mut self, games: Option<&[String]>) -> Result<(), ConfigError> {
        let games = resolve(games, self.games.as_deref(), "game list")?;
        self.collection = self.collection.filter_by_game(games)?;
        Ok(())
    }

    /// Narrow the collection to tournaments run by one of the given owners.
    pub fn filter_by_owner(&mut self, owners: Option<&[OwnerId]>) -> Result<(), ConfigError> {
        let owners = resolve(owners, self.owners.as_deref(), "owner list")?;
        self.collection = self.collection.filter_by_owner(owners)?;
        Ok(())
    }

    /// Narrow the collection to tournaments held in the given state.
    pub fn filter_by_state(&mut self, state: Option<&str>) -> Result<(), ConfigError> {
        let state = resolve(state, self.state.as_deref(), "state")?;
        self.collection = self.collection.filter_by_state(state)?;
        Ok(())
    }

    /// Write the current collection to `path` as JSON.
    pub fn export(&self, path: &Path) -> Result<(), ExportError> {
        export::export_collection(&self.collection, path)
    }
}

/// Explicit argument wins over the stored default; neither present fails.
fn resolve<'a, T: ?Sized>(
    explicit: Option<&'a T>,
    stored: Option<&'a T>,
    what: &'static str,
) -> Result<&'a T, ConfigError> {
    explicit
        .or(stored)
        .ok_or(ConfigError::EmptySelector { what })
}
