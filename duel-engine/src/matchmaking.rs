//! Matchmaking queue
//!
//! Pairing happens inline on enqueue; there is no scheduler loop. Each
//! call evicts stale entries, inserts the requester, then tries to pair
//! it with the fresh candidate whose rating is closest.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{Match, QueueEntry};
use crate::ratings::RatingBook;
use crate::repository::{with_timeout, DuelRepository};

/// Result of one enqueue call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueOutcome {
    pub matched: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none", default)]
    pub duel_match: Option<Match>,
}

impl EnqueueOutcome {
    fn waiting() -> Self {
        Self {
            matched: false,
            duel_match: None,
        }
    }

    fn paired(duel: Match) -> Self {
        Self {
            matched: true,
            duel_match: Some(duel),
        }
    }
}

pub struct MatchmakingQueue {
    repo: Arc<dyn DuelRepository>,
    clock: Arc<dyn Clock>,
    ratings: Arc<RatingBook>,
    config: EngineConfig,
    /// Serializes evict/insert/select/pair within this process
    pairing: Mutex<()>,
}

impl MatchmakingQueue {
    pub fn new(
        repo: Arc<dyn DuelRepository>,
        clock: Arc<dyn Clock>,
        ratings: Arc<RatingBook>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repo,
            clock,
            ratings,
            config,
            pairing: Mutex::new(()),
        }
    }

    pub async fn enqueue(&self, hero_id: &str, hero_name: &str) -> EngineResult<EnqueueOutcome> {
        if hero_id.trim().is_empty() {
            return Err(EngineError::Validation("hero id is required".into()));
        }
        if hero_name.trim().is_empty() {
            return Err(EngineError::Validation("hero name is required".into()));
        }

        let _guard = self.pairing.lock().await;
        let timeout = self.config.repository_timeout;
        let now = self.clock.now();

        // 1. Lazy sweep
        match with_timeout(timeout, self.repo.evict_queue_entries(now - self.config.queue_ttl)).await {
            Ok(0) => {}
            Ok(evicted) => debug!(evicted, "expired queue entries removed"),
            Err(e) => warn!(error = %e, "queue eviction failed"),
        }

        // 2. Insert; nothing can proceed without it
        let requester = QueueEntry {
            hero_id: hero_id.to_string(),
            hero_name: hero_name.to_string(),
            enqueued_at: now,
        };
        with_timeout(timeout, self.repo.upsert_queue_entry(requester.clone())).await?;

        // 3. Candidates, oldest first. Never older than the ttl even if the
        // fresh window is configured wider.
        let since = (now - self.config.fresh_window).max(now - self.config.queue_ttl);
        let candidates = match with_timeout(
            timeout,
            self.repo
                .queue_entries_since(since, hero_id, self.config.max_candidates),
        )
        .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(hero_id = %hero_id, error = %e, "candidate lookup failed");
                return Ok(EnqueueOutcome::waiting());
            }
        };
        if candidates.is_empty() {
            debug!(hero_id = %hero_id, "no candidates, waiting");
            return Ok(EnqueueOutcome::waiting());
        }

        // 4. Closest rating
        let Some(opponent) = self.closest(&requester, candidates).await else {
            return Ok(EnqueueOutcome::waiting());
        };

        // 5. Pair atomically
        let duel = Match::pending(&requester, &opponent, now);
        match with_timeout(
            timeout,
            self.repo
                .pair_queue_entries(&requester.hero_id, &opponent.hero_id, duel.clone()),
        )
        .await
        {
            Ok(true) => {
                info!(
                    match_id = %duel.id,
                    hero_a = %duel.hero_a_id,
                    hero_b = %duel.hero_b_id,
                    "heroes paired"
                );
                Ok(EnqueueOutcome::paired(duel))
            }
            Ok(false) => {
                debug!(hero_id = %hero_id, opponent = %opponent.hero_id, "lost pairing race");
                Ok(EnqueueOutcome::waiting())
            }
            Err(e) => {
                warn!(hero_id = %hero_id, error = %e, "pairing write failed");
                Ok(EnqueueOutcome::waiting())
            }
        }
    }

    /// Candidate with the rating closest to the requester's. Ties go to the
    /// earliest entry; on lookup failure the earliest entry wins outright.
    async fn closest(&self, requester: &QueueEntry, candidates: Vec<QueueEntry>) -> Option<QueueEntry> {
        let mut ids: Vec<String> = candidates.iter().map(|c| c.hero_id.clone()).collect();
        ids.push(requester.hero_id.clone());

        let ratings = match self.ratings.ratings_of(&ids).await {
            Ok(ratings) => ratings,
            Err(e) => {
                warn!(hero_id = %requester.hero_id, error = %e, "rating lookup failed, pairing by queue order");
                return candidates.into_iter().next();
            }
        };

        let default = self.config.default_rating;
        let own = ratings.get(&requester.hero_id).copied().unwrap_or(default);

        // min_by_key keeps the first of equal keys
        candidates.into_iter().min_by_key(|c| {
            let theirs = ratings.get(&c.hero_id).copied().unwrap_or(default);
            (i64::from(theirs) - i64::from(own)).abs()
        })
    }

    /// Drop a waiting hero. Returns false if it was not queued.
    pub async fn leave(&self, hero_id: &str) -> EngineResult<bool> {
        let _guard = self.pairing.lock().await;
        let removed =
            with_timeout(self.config.repository_timeout, self.repo.remove_queue_entry(hero_id)).await?;
        if removed {
            debug!(hero_id = %hero_id, "left queue");
        }
        Ok(removed)
    }

    pub async fn size(&self) -> EngineResult<usize> {
        Ok(with_timeout(self.config.repository_timeout, self.repo.queue_len()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::{MatchStatus, Rating};
    use crate::repository::{InMemoryRepository, RecordKind};
    use chrono::{DateTime, Duration, Utc};

    struct Fixture {
        queue: MatchmakingQueue,
        repo: Arc<InMemoryRepository>,
        clock: ManualClock,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = ManualClock::default();
        let config = EngineConfig::default();
        let ratings = Arc::new(RatingBook::new(
            repo.clone(),
            Arc::new(clock.clone()),
            config.clone(),
        ));
        let queue = MatchmakingQueue::new(repo.clone(), Arc::new(clock.clone()), ratings, config);
        Fixture { queue, repo, clock }
    }

    impl Fixture {
        async fn rate(&self, hero_id: &str, rating: i32) {
            let mut row = Rating::initial(hero_id, hero_id, self.clock.now());
            row.rating = rating;
            self.repo.upsert_ratings(vec![row]).await.unwrap();
        }

        async fn queue_at(&self, hero_id: &str, at: DateTime<Utc>) {
            self.repo
                .upsert_queue_entry(QueueEntry {
                    hero_id: hero_id.to_string(),
                    hero_name: hero_id.to_string(),
                    enqueued_at: at,
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_first_hero_waits_second_pairs() {
        let f = fixture();
        let first = f.queue.enqueue("a", "Aria").await.unwrap();
        assert!(!first.matched);
        assert!(first.duel_match.is_none());
        assert_eq!(f.queue.size().await.unwrap(), 1);

        f.clock.advance(Duration::seconds(5));
        let second = f.queue.enqueue("b", "Brann").await.unwrap();
        assert!(second.matched);
        let duel = second.duel_match.unwrap();
        assert_eq!(duel.status, MatchStatus::Pending);
        assert_eq!(duel.hero_a_id, "b");
        assert_eq!(duel.hero_b_id, "a");
        assert_eq!(duel.hero_b_name, "Aria");
        assert_eq!(f.queue.size().await.unwrap(), 0);
        assert_eq!(f.repo.get_match(duel.id).await.unwrap(), Some(duel));
    }

    #[tokio::test]
    async fn test_expired_entry_is_never_a_candidate() {
        let f = fixture();
        f.queue.enqueue("a", "Aria").await.unwrap();
        f.clock.advance(Duration::minutes(3) + Duration::seconds(1));

        let outcome = f.queue.enqueue("b", "Brann").await.unwrap();
        assert!(!outcome.matched);
        // "a" was swept
        assert_eq!(f.queue.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stale_but_unexpired_entry_waits() {
        let f = fixture();
        f.queue.enqueue("a", "Aria").await.unwrap();
        f.clock.advance(Duration::seconds(90));

        let outcome = f.queue.enqueue("b", "Brann").await.unwrap();
        assert!(!outcome.matched);
        assert_eq!(f.queue.size().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_closest_rating_wins() {
        let f = fixture();
        f.rate("r", 1100).await;
        f.rate("far", 1000).await;
        f.rate("near", 1080).await;

        let now = f.clock.now();
        f.queue_at("far", now - Duration::seconds(20)).await;
        f.queue_at("near", now - Duration::seconds(10)).await;

        let duel = f.queue.enqueue("r", "Rook").await.unwrap().duel_match.unwrap();
        assert_eq!(duel.hero_b_id, "near");
        assert_eq!(f.queue.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unrated_heroes_count_as_default() {
        let f = fixture();
        f.rate("high", 1400).await;

        let now = f.clock.now();
        f.queue_at("high", now - Duration::seconds(20)).await;
        f.queue_at("fresh", now - Duration::seconds(10)).await;

        let duel = f.queue.enqueue("r", "Rook").await.unwrap().duel_match.unwrap();
        assert_eq!(duel.hero_b_id, "fresh");
    }

    #[tokio::test]
    async fn test_rating_tie_goes_to_earliest() {
        let f = fixture();
        f.rate("r", 1000).await;
        f.rate("late", 1050).await;
        f.rate("early", 950).await;

        let now = f.clock.now();
        f.queue_at("late", now - Duration::seconds(5)).await;
        f.queue_at("early", now - Duration::seconds(30)).await;

        let duel = f.queue.enqueue("r", "Rook").await.unwrap().duel_match.unwrap();
        assert_eq!(duel.hero_b_id, "early");
    }

    #[tokio::test]
    async fn test_rating_outage_falls_back_to_queue_order() {
        let f = fixture();
        f.rate("r", 1100).await;
        f.rate("old", 600).await;
        f.rate("near", 1100).await;

        let now = f.clock.now();
        f.queue_at("old", now - Duration::seconds(30)).await;
        f.queue_at("near", now - Duration::seconds(10)).await;

        f.repo.set_offline(RecordKind::Ratings, true);
        let duel = f.queue.enqueue("r", "Rook").await.unwrap().duel_match.unwrap();
        assert_eq!(duel.hero_b_id, "old");
    }

    #[tokio::test]
    async fn test_candidates_capped_at_ten() {
        let f = fixture();
        let now = f.clock.now();
        // Eleven queued; the only close rating is the newest
        for i in 0..11 {
            let id = format!("h{:02}", i);
            f.rate(&id, 500).await;
            f.queue_at(&id, now - Duration::seconds(40 - i)).await;
        }
        f.rate("h10", 1000).await;

        let duel = f.queue.enqueue("r", "Rook").await.unwrap().duel_match.unwrap();
        assert_eq!(duel.hero_b_id, "h00");
    }

    #[tokio::test]
    async fn test_queue_outage_is_a_dependency_error() {
        let f = fixture();
        f.repo.set_offline(RecordKind::Queue, true);
        let err = f.queue.enqueue("a", "Aria").await.unwrap_err();
        assert!(matches!(err, EngineError::Dependency(_)));
    }

    #[tokio::test]
    async fn test_match_store_outage_leaves_hero_waiting() {
        let f = fixture();
        f.queue.enqueue("a", "Aria").await.unwrap();
        f.repo.set_offline(RecordKind::Matches, true);

        let outcome = f.queue.enqueue("b", "Brann").await.unwrap();
        assert!(!outcome.matched);
        assert_eq!(f.queue.size().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_blank_ids_rejected() {
        let f = fixture();
        assert!(matches!(
            f.queue.enqueue(" ", "Aria").await,
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            f.queue.enqueue("a", "").await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_leave_queue() {
        let f = fixture();
        f.queue.enqueue("a", "Aria").await.unwrap();
        assert!(f.queue.leave("a").await.unwrap());
        assert!(!f.queue.leave("a").await.unwrap());
        assert_eq!(f.queue.size().await.unwrap(), 0);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(EnqueueOutcome::waiting()).unwrap();
        assert_eq!(json, serde_json::json!({ "matched": false }));
    }
}
