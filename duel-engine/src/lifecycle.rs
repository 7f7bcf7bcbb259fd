//! Match lifecycle: pending -> started -> completed
//!
//! Completion is retry-safe. The call whose write moves the stored match to
//! completed writes the audit events and applies ratings; later ones only
//! overwrite the result fields, even when they race the first.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use duel_core::RatedOutcome;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{DuelEvent, DuelEventKind, Match, MatchStatus};
use crate::ratings::{RatedSide, RatingBook};
use crate::repository::{with_timeout, DuelRepository};

/// Reported result of a match, before clamping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub winner_id: String,
    pub xp: i64,
    pub gold: i64,
    pub duration_ms: i64,
}

pub struct MatchLifecycle {
    repo: Arc<dyn DuelRepository>,
    clock: Arc<dyn Clock>,
    ratings: Arc<RatingBook>,
    config: EngineConfig,
    /// Serializes start/complete read-modify-write within this process
    transitions: Mutex<()>,
}

impl MatchLifecycle {
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
            transitions: Mutex::new(()),
        }
    }

    pub async fn get(&self, id: Uuid) -> EngineResult<Match> {
        with_timeout(self.config.repository_timeout, self.repo.get_match(id))
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("match {}", id)))
    }

    /// Open match the hero is part of, if any
    pub async fn current_for(&self, hero_id: &str) -> EngineResult<Option<Match>> {
        Ok(with_timeout(
            self.config.repository_timeout,
            self.repo.open_match_for_hero(hero_id),
        )
        .await?)
    }

    pub async fn start(&self, id: Uuid) -> EngineResult<Match> {
        let _guard = self.transitions.lock().await;
        let mut duel = self.get(id).await?;
        match duel.status {
            MatchStatus::Started => return Ok(duel),
            status if !status.can_transition_to(&MatchStatus::Started) => {
                return Err(EngineError::InvalidTransition {
                    id,
                    from: status,
                    to: MatchStatus::Started,
                });
            }
            _ => {}
        }

        let now = self.clock.now();
        duel.status = MatchStatus::Started;
        duel.started_at = Some(now);
        with_timeout(self.config.repository_timeout, self.repo.update_match(duel.clone())).await?;

        let events: Vec<DuelEvent> = duel
            .sides()
            .iter()
            .zip(duel.sides().iter().rev())
            .map(|((hero_id, hero_name), (_, opponent_name))| {
                DuelEvent::new(DuelEventKind::Start, hero_id, hero_name, opponent_name, now)
                    .for_match(id)
            })
            .collect();
        self.record(events).await;

        info!(match_id = %id, "match started");
        Ok(duel)
    }

    pub async fn complete(&self, id: Uuid, result: MatchResult) -> EngineResult<Match> {
        let _guard = self.transitions.lock().await;
        let mut duel = self.get(id).await?;
        if !duel.involves(&result.winner_id) {
            return Err(EngineError::Validation(format!(
                "winner {} is not part of match {}",
                result.winner_id, id
            )));
        }
        if !duel.status.can_transition_to(&MatchStatus::Completed) {
            return Err(EngineError::InvalidTransition {
                id,
                from: duel.status,
                to: MatchStatus::Completed,
            });
        }

        let xp = clamp_u32(result.xp, self.config.max_xp);
        let gold = clamp_u32(result.gold, self.config.max_gold);
        let duration_ms = result.duration_ms.clamp(0, self.config.max_duration_ms as i64) as u64;
        let now = self.clock.now();

        duel.winner_id = Some(result.winner_id.clone());
        duel.xp_awarded = Some(xp);
        duel.gold_awarded = Some(gold);
        duel.duration_ms = Some(duration_ms);
        if !duel.status.is_terminal() {
            duel.completed_at = Some(now);
        }
        duel.status = MatchStatus::Completed;

        // The store decides which call made the transition
        let first_completion =
            with_timeout(self.config.repository_timeout, self.repo.complete_match(duel.clone()))
                .await?;
        if !first_completion {
            info!(match_id = %id, winner = %result.winner_id, "completion retried");
            return self.get(id).await;
        }

        let [(a_id, a_name), (b_id, b_name)] = duel.sides();
        let side_event = |hero_id: &str, hero_name: &str, opponent_name: &str| {
            let won = hero_id == result.winner_id;
            let (xp, gold) = if won { (xp, gold) } else { (0, 0) };
            DuelEvent::new(DuelEventKind::MatchComplete, hero_id, hero_name, opponent_name, now)
                .for_match(id)
                .with_result(won, xp, gold)
        };
        self.record(vec![
            side_event(a_id, a_name, b_name),
            side_event(b_id, b_name, a_name),
        ])
        .await;

        if duel.ranked {
            let outcome = if result.winner_id == a_id {
                RatedOutcome::AWins
            } else {
                RatedOutcome::BWins
            };
            if let Err(e) = self
                .ratings
                .record_result(RatedSide::new(a_id, a_name), RatedSide::new(b_id, b_name), outcome)
                .await
            {
                warn!(match_id = %id, error = %e, "rating update failed, match left unrated");
            }
        }

        info!(
            match_id = %id,
            winner = %result.winner_id,
            xp,
            gold,
            duration_ms,
            ranked = duel.ranked,
            "match completed"
        );
        Ok(duel)
    }

    /// Best-effort audit write
    async fn record(&self, events: Vec<DuelEvent>) {
        if let Err(e) = with_timeout(self.config.repository_timeout, self.repo.append_events(events)).await {
            warn!(error = %e, "audit write failed");
        }
    }
}

fn clamp_u32(value: i64, max: u32) -> u32 {
    value.clamp(0, i64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::QueueEntry;
    use crate::repository::{InMemoryRepository, RecordKind};
    use chrono::Duration;

    struct Fixture {
        lifecycle: MatchLifecycle,
        ratings: Arc<RatingBook>,
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
        let lifecycle =
            MatchLifecycle::new(repo.clone(), Arc::new(clock.clone()), ratings.clone(), config);
        Fixture {
            lifecycle,
            ratings,
            repo,
            clock,
        }
    }

    impl Fixture {
        /// Queue two heroes and pair them the way matchmaking does
        async fn pending(&self) -> Match {
            let now = self.clock.now();
            let a = QueueEntry {
                hero_id: "a".into(),
                hero_name: "Aria".into(),
                enqueued_at: now,
            };
            let b = QueueEntry {
                hero_id: "b".into(),
                hero_name: "Brann".into(),
                enqueued_at: now,
            };
            self.repo.upsert_queue_entry(a.clone()).await.unwrap();
            self.repo.upsert_queue_entry(b.clone()).await.unwrap();
            let duel = Match::pending(&a, &b, now);
            assert!(self.repo.pair_queue_entries("a", "b", duel.clone()).await.unwrap());
            duel
        }
    }

    fn win(winner: &str) -> MatchResult {
        MatchResult {
            winner_id: winner.to_string(),
            xp: 120,
            gold: 40,
            duration_ms: 30_000,
        }
    }

    #[tokio::test]
    async fn test_start_then_complete() {
        let f = fixture();
        let duel = f.pending().await;

        let started = f.lifecycle.start(duel.id).await.unwrap();
        assert_eq!(started.status, MatchStatus::Started);
        assert!(started.started_at.is_some());

        f.clock.advance(Duration::seconds(30));
        let done = f.lifecycle.complete(duel.id, win("a")).await.unwrap();
        assert_eq!(done.status, MatchStatus::Completed);
        assert_eq!(done.winner_id.as_deref(), Some("a"));
        assert_eq!(done.xp_awarded, Some(120));
        assert_eq!(done.duration_ms, Some(30_000));

        assert_eq!(f.ratings.rating_of("a").await, 1016);
        assert_eq!(f.ratings.rating_of("b").await, 984);

        let events = f.repo.events_for_hero("a", 10).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, DuelEventKind::MatchComplete);
        assert_eq!(events[0].victory, Some(true));
        assert_eq!((events[0].xp, events[0].gold), (120, 40));
        assert_eq!(events[1].kind, DuelEventKind::Start);

        let loser = f.repo.events_for_hero("b", 1).await.unwrap();
        assert_eq!(loser[0].victory, Some(false));
        assert_eq!((loser[0].xp, loser[0].gold), (0, 0));
        assert_eq!(loser[0].opponent_name, "Aria");
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let f = fixture();
        let duel = f.pending().await;
        let first = f.lifecycle.start(duel.id).await.unwrap();
        f.clock.advance(Duration::seconds(5));
        let again = f.lifecycle.start(duel.id).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(f.repo.events_for_hero("a", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_can_complete_directly() {
        let f = fixture();
        let duel = f.pending().await;
        let done = f.lifecycle.complete(duel.id, win("b")).await.unwrap();
        assert_eq!(done.status, MatchStatus::Completed);
        assert!(done.started_at.is_none());
        assert_eq!(f.ratings.rating_of("b").await, 1016);
    }

    #[tokio::test]
    async fn test_cannot_start_completed_match() {
        let f = fixture();
        let duel = f.pending().await;
        f.lifecycle.complete(duel.id, win("a")).await.unwrap();
        let err = f.lifecycle.start(duel.id).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidTransition {
                from: MatchStatus::Completed,
                to: MatchStatus::Started,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_repeat_completion_does_not_reapply_ratings() {
        let f = fixture();
        let duel = f.pending().await;
        let first = f.lifecycle.complete(duel.id, win("a")).await.unwrap();
        f.clock.advance(Duration::seconds(10));
        let second = f.lifecycle.complete(duel.id, win("a")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(f.ratings.rating_of("a").await, 1016);
        assert_eq!(f.repo.events_for_hero("a", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_winner_must_be_a_participant() {
        let f = fixture();
        let duel = f.pending().await;
        let err = f.lifecycle.complete(duel.id, win("zed")).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(f.lifecycle.get(duel.id).await.unwrap().status, MatchStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_match_not_found() {
        let f = fixture();
        let id = Uuid::new_v4();
        assert!(matches!(f.lifecycle.start(id).await, Err(EngineError::NotFound(_))));
        assert!(matches!(
            f.lifecycle.complete(id, win("a")).await,
            Err(EngineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rewards_and_duration_are_clamped() {
        let f = fixture();
        let duel = f.pending().await;
        let done = f
            .lifecycle
            .complete(
                duel.id,
                MatchResult {
                    winner_id: "a".into(),
                    xp: 1_000_000,
                    gold: -5,
                    duration_ms: i64::MAX,
                },
            )
            .await
            .unwrap();
        assert_eq!(done.xp_awarded, Some(5_000));
        assert_eq!(done.gold_awarded, Some(0));
        assert_eq!(done.duration_ms, Some(86_400_000));
    }

    #[tokio::test]
    async fn test_rating_outage_is_not_fatal() {
        let f = fixture();
        let duel = f.pending().await;
        f.repo.set_offline(RecordKind::Ratings, true);
        let done = f.lifecycle.complete(duel.id, win("a")).await.unwrap();
        assert_eq!(done.status, MatchStatus::Completed);

        f.repo.set_offline(RecordKind::Ratings, false);
        assert_eq!(f.ratings.rating_of("a").await, 1000);
    }

    #[tokio::test]
    async fn test_unranked_match_keeps_ratings() {
        let f = fixture();
        let mut duel = f.pending().await;
        duel.ranked = false;
        f.repo.update_match(duel.clone()).await.unwrap();

        f.lifecycle.complete(duel.id, win("a")).await.unwrap();
        assert_eq!(f.ratings.rating_of("a").await, 1000);
        assert_eq!(f.repo.events_for_hero("b", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_current_match_for_hero() {
        let f = fixture();
        assert!(f.lifecycle.current_for("a").await.unwrap().is_none());
        let duel = f.pending().await;
        assert_eq!(f.lifecycle.current_for("b").await.unwrap(), Some(duel.clone()));

        f.lifecycle.complete(duel.id, win("a")).await.unwrap();
        assert!(f.lifecycle.current_for("a").await.unwrap().is_none());
    }
}
