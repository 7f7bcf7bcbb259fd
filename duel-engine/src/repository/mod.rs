//! Repository contract for queue, match, rating and event records
//!
//! The engine never talks to a storage engine directly. Everything it
//! persists goes through `DuelRepository`, so a database-backed store and
//! the in-memory store used by tests and the dev server are interchangeable.

mod memory;

pub use memory::{InMemoryRepository, RecordKind};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{DuelEvent, Match, QueueEntry, Rating};

/// Errors surfaced by repository implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("repository call timed out after {0:?}")]
    Timeout(Duration),
}

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

/// Storage for the four duel record kinds
///
/// Implementations must make `pair_queue_entries` and `upsert_ratings`
/// atomic: either every row in the call is written or none is.
#[async_trait]
pub trait DuelRepository: Send + Sync {
    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    /// Insert or refresh a hero's queue entry
    async fn upsert_queue_entry(&self, entry: QueueEntry) -> RepoResult<()>;

    /// Delete entries enqueued before `cutoff`. Returns how many were removed.
    async fn evict_queue_entries(&self, cutoff: DateTime<Utc>) -> RepoResult<usize>;

    /// Entries enqueued at or after `since`, excluding `exclude_hero`,
    /// oldest first, at most `limit`
    async fn queue_entries_since(
        &self,
        since: DateTime<Utc>,
        exclude_hero: &str,
        limit: usize,
    ) -> RepoResult<Vec<QueueEntry>>;

    /// Remove one hero's entry. Returns false if it was not queued.
    async fn remove_queue_entry(&self, hero_id: &str) -> RepoResult<bool>;

    async fn queue_len(&self) -> RepoResult<usize>;

    /// Delete both queue entries and insert `duel` as one unit.
    ///
    /// Returns `Ok(false)` without writing anything if either entry is
    /// already gone; the first writer wins.
    async fn pair_queue_entries(&self, hero_a: &str, hero_b: &str, duel: Match)
        -> RepoResult<bool>;

    // ------------------------------------------------------------------
    // Matches
    // ------------------------------------------------------------------

    async fn get_match(&self, id: Uuid) -> RepoResult<Option<Match>>;

    /// Overwrite an existing match
    async fn update_match(&self, duel: Match) -> RepoResult<()>;

    /// Store a completed match as one conditional write.
    ///
    /// Returns `Ok(true)` only for the call that moved the stored match out
    /// of pending/started. Later calls overwrite the result fields but keep
    /// the original `completed_at` and return `Ok(false)`.
    async fn complete_match(&self, duel: Match) -> RepoResult<bool>;

    /// Most recent pending or started match involving `hero_id`
    async fn open_match_for_hero(&self, hero_id: &str) -> RepoResult<Option<Match>>;

    // ------------------------------------------------------------------
    // Ratings
    // ------------------------------------------------------------------

    async fn get_ratings(&self, hero_ids: &[String]) -> RepoResult<Vec<Rating>>;

    async fn upsert_ratings(&self, ratings: Vec<Rating>) -> RepoResult<()>;

    /// Highest ratings first, ties by hero id
    async fn top_ratings(&self, limit: usize) -> RepoResult<Vec<Rating>>;

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    async fn append_events(&self, events: Vec<DuelEvent>) -> RepoResult<()>;

    async fn events_since(&self, since: DateTime<Utc>) -> RepoResult<Vec<DuelEvent>>;

    /// Newest first
    async fn events_for_hero(&self, hero_id: &str, limit: usize) -> RepoResult<Vec<DuelEvent>>;
}

/// Run a repository call under `limit`
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> RepoResult<T>
where
    F: Future<Output = RepoResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::Timeout(limit)),
    }
}
