//! Tournament domain: records, collections, and the pull/filter facade.

pub mod models;
pub mod puller;

pub use models::{
    OwnerId, TimeWindow, TournamentCollection, TournamentEvent, TournamentId, TournamentRecord,
};
pub use puller::TournamentPuller;
