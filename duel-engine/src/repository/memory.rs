//! In-memory repository for tests and the development server.
//!
//! All tables sit behind one lock, which makes every trait method,
//! including the multi-row ones, atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{DuelRepository, RepoResult, RepositoryError};
use crate::model::{DuelEvent, Match, MatchStatus, QueueEntry, Rating};

/// Table groups that can be taken offline to exercise degraded paths
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Queue,
    Matches,
    Ratings,
    Events,
}

#[derive(Default)]
struct Tables {
    queue: FxHashMap<String, QueueEntry>,
    matches: FxHashMap<Uuid, Match>,
    ratings: FxHashMap<String, Rating>,
    events: Vec<DuelEvent>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    offline: RwLock<FxHashSet<RecordKind>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call touching `kind` fail with `Unavailable`
    pub fn set_offline(&self, kind: RecordKind, offline: bool) {
        let mut set = self.offline.write().unwrap_or_else(|e| e.into_inner());
        if offline {
            set.insert(kind);
        } else {
            set.remove(&kind);
        }
    }

    fn check(&self, kind: RecordKind) -> RepoResult<()> {
        let set = self.offline.read().map_err(|_| RepositoryError::LockPoisoned)?;
        if set.contains(&kind) {
            return Err(RepositoryError::Unavailable(format!("{:?} offline", kind)));
        }
        Ok(())
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| RepositoryError::LockPoisoned)
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| RepositoryError::LockPoisoned)
    }
}

#[async_trait]
impl DuelRepository for InMemoryRepository {
    async fn upsert_queue_entry(&self, entry: QueueEntry) -> RepoResult<()> {
        self.check(RecordKind::Queue)?;
        self.write()?.queue.insert(entry.hero_id.clone(), entry);
        Ok(())
    }

    async fn evict_queue_entries(&self, cutoff: DateTime<Utc>) -> RepoResult<usize> {
        self.check(RecordKind::Queue)?;
        let mut tables = self.write()?;
        let before = tables.queue.len();
        tables.queue.retain(|_, e| e.enqueued_at >= cutoff);
        Ok(before - tables.queue.len())
    }

    async fn queue_entries_since(
        &self,
        since: DateTime<Utc>,
        exclude_hero: &str,
        limit: usize,
    ) -> RepoResult<Vec<QueueEntry>> {
        self.check(RecordKind::Queue)?;
        let tables = self.read()?;
        let mut entries: Vec<QueueEntry> = tables
            .queue
            .values()
            .filter(|e| e.hero_id != exclude_hero && e.enqueued_at >= since)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.enqueued_at
                .cmp(&b.enqueued_at)
                .then_with(|| a.hero_id.cmp(&b.hero_id))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    async fn remove_queue_entry(&self, hero_id: &str) -> RepoResult<bool> {
        self.check(RecordKind::Queue)?;
        Ok(self.write()?.queue.remove(hero_id).is_some())
    }

    async fn queue_len(&self) -> RepoResult<usize> {
        self.check(RecordKind::Queue)?;
        Ok(self.read()?.queue.len())
    }

    async fn pair_queue_entries(
        &self,
        hero_a: &str,
        hero_b: &str,
        duel: Match,
    ) -> RepoResult<bool> {
        self.check(RecordKind::Queue)?;
        self.check(RecordKind::Matches)?;
        let mut tables = self.write()?;
        if !tables.queue.contains_key(hero_a) || !tables.queue.contains_key(hero_b) {
            return Ok(false);
        }
        if tables.matches.contains_key(&duel.id) {
            return Err(RepositoryError::Conflict(format!("match {} exists", duel.id)));
        }
        tables.queue.remove(hero_a);
        tables.queue.remove(hero_b);
        tables.matches.insert(duel.id, duel);
        Ok(true)
    }

    async fn get_match(&self, id: Uuid) -> RepoResult<Option<Match>> {
        self.check(RecordKind::Matches)?;
        Ok(self.read()?.matches.get(&id).cloned())
    }

    async fn update_match(&self, duel: Match) -> RepoResult<()> {
        self.check(RecordKind::Matches)?;
        let mut tables = self.write()?;
        match tables.matches.get_mut(&duel.id) {
            Some(slot) => {
                *slot = duel;
                Ok(())
            }
            None => Err(RepositoryError::Conflict(format!("match {} missing", duel.id))),
        }
    }

    async fn complete_match(&self, mut duel: Match) -> RepoResult<bool> {
        self.check(RecordKind::Matches)?;
        let mut tables = self.write()?;
        let Some(slot) = tables.matches.get_mut(&duel.id) else {
            return Err(RepositoryError::Conflict(format!("match {} missing", duel.id)));
        };
        let first = !slot.status.is_terminal();
        if !first {
            duel.completed_at = slot.completed_at;
        }
        *slot = duel;
        Ok(first)
    }

    async fn open_match_for_hero(&self, hero_id: &str) -> RepoResult<Option<Match>> {
        self.check(RecordKind::Matches)?;
        let tables = self.read()?;
        Ok(tables
            .matches
            .values()
            .filter(|m| m.status != MatchStatus::Completed && m.involves(hero_id))
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn get_ratings(&self, hero_ids: &[String]) -> RepoResult<Vec<Rating>> {
        self.check(RecordKind::Ratings)?;
        let tables = self.read()?;
        Ok(hero_ids
            .iter()
            .filter_map(|id| tables.ratings.get(id).cloned())
            .collect())
    }

    async fn upsert_ratings(&self, ratings: Vec<Rating>) -> RepoResult<()> {
        self.check(RecordKind::Ratings)?;
        let mut tables = self.write()?;
        for rating in ratings {
            tables.ratings.insert(rating.hero_id.clone(), rating);
        }
        Ok(())
    }

    async fn top_ratings(&self, limit: usize) -> RepoResult<Vec<Rating>> {
        self.check(RecordKind::Ratings)?;
        let tables = self.read()?;
        let mut rows: Vec<Rating> = tables.ratings.values().cloned().collect();
        rows.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.hero_id.cmp(&b.hero_id)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn append_events(&self, events: Vec<DuelEvent>) -> RepoResult<()> {
        self.check(RecordKind::Events)?;
        self.write()?.events.extend(events);
        Ok(())
    }

    async fn events_since(&self, since: DateTime<Utc>) -> RepoResult<Vec<DuelEvent>> {
        self.check(RecordKind::Events)?;
        let tables = self.read()?;
        Ok(tables
            .events
            .iter()
            .filter(|e| e.created_at >= since)
            .cloned()
            .collect())
    }

    async fn events_for_hero(&self, hero_id: &str, limit: usize) -> RepoResult<Vec<DuelEvent>> {
        self.check(RecordKind::Events)?;
        let tables = self.read()?;
        // Append order breaks timestamp ties
        Ok(tables
            .events
            .iter()
            .rev()
            .filter(|e| e.hero_id == hero_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
