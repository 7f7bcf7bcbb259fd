//! Duel engine facade
//!
//! Wires the rating book, matchmaking queue and match lifecycle to one
//! repository and clock, and adds the read-side operations (ratings,
//! leaderboards, history) plus direct resolution.

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use duel_core::{resolve_with_element, CombatOutcome, Element, HeroSnapshot, RatedOutcome};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::lifecycle::{MatchLifecycle, MatchResult};
use crate::matchmaking::{EnqueueOutcome, MatchmakingQueue};
use crate::model::{DuelEvent, DuelEventKind, LeaderboardEntry, Match, WeeklyStanding};
use crate::ratings::{RatedSide, RatingBook};
use crate::repository::{with_timeout, DuelRepository, InMemoryRepository};

/// Direct resolution request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub hero: HeroSnapshot,
    #[serde(default)]
    pub opponent: Option<HeroSnapshot>,
    /// Overrides the opponent's own affinity
    #[serde(default)]
    pub opponent_element: Option<Element>,
    /// Drawn server-side when absent
    #[serde(default)]
    pub seed: Option<u32>,
    /// Only applies when the opponent is a real hero with an id
    #[serde(default)]
    pub ranked: bool,
}

impl ResolveRequest {
    pub fn new(hero: HeroSnapshot) -> Self {
        Self {
            hero,
            opponent: None,
            opponent_element: None,
            seed: None,
            ranked: false,
        }
    }

    pub fn against(mut self, opponent: HeroSnapshot) -> Self {
        self.opponent = Some(opponent);
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn ranked(mut self) -> Self {
        self.ranked = true;
        self
    }
}

pub struct DuelEngine {
    repo: Arc<dyn DuelRepository>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    ratings: Arc<RatingBook>,
    queue: MatchmakingQueue,
    lifecycle: MatchLifecycle,
}

impl DuelEngine {
    pub fn new(repo: Arc<dyn DuelRepository>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        let ratings = Arc::new(RatingBook::new(repo.clone(), clock.clone(), config.clone()));
        let queue =
            MatchmakingQueue::new(repo.clone(), clock.clone(), ratings.clone(), config.clone());
        let lifecycle =
            MatchLifecycle::new(repo.clone(), clock.clone(), ratings.clone(), config.clone());
        Self {
            repo,
            clock,
            config,
            ratings,
            queue,
            lifecycle,
        }
    }

    /// Engine over a fresh in-memory store and the wall clock
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(Arc::new(InMemoryRepository::new()), Arc::new(SystemClock), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Direct resolution
    // ========================================================================

    /// Resolve one duel and record it. Audit and rating writes are
    /// best-effort; only invalid input fails the call.
    pub async fn resolve(&self, request: ResolveRequest) -> EngineResult<CombatOutcome> {
        let hero_id = match request.hero.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(EngineError::Validation("hero id is required".into())),
        };
        let opponent_id = request
            .opponent
            .as_ref()
            .and_then(|o| o.id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        if opponent_id.as_deref() == Some(hero_id.as_str()) {
            return Err(EngineError::Validation(format!(
                "hero {} cannot duel itself",
                hero_id
            )));
        }

        let seed = request.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let outcome = resolve_with_element(
            &request.hero,
            request.opponent.as_ref(),
            request.opponent_element,
            seed,
        )?;

        let now = self.clock.now();
        let mut events = vec![DuelEvent::new(
            DuelEventKind::Resolved,
            &hero_id,
            &request.hero.name,
            &outcome.opponent.name,
            now,
        )
        .with_result(outcome.victory, outcome.xp_gained, outcome.gold_gained)
        .with_seed(seed)];
        if let Some(opponent_id) = &opponent_id {
            events.push(
                DuelEvent::new(
                    DuelEventKind::Result,
                    opponent_id,
                    &outcome.opponent.name,
                    &request.hero.name,
                    now,
                )
                .with_result(!outcome.victory, 0, 0)
                .with_seed(seed),
            );
        }
        if let Err(e) = with_timeout(self.config.repository_timeout, self.repo.append_events(events)).await {
            warn!(hero_id = %hero_id, seed, error = %e, "audit write failed");
        }

        match (&opponent_id, request.ranked) {
            (Some(opponent_id), true) => {
                let rated = if outcome.victory {
                    RatedOutcome::AWins
                } else {
                    RatedOutcome::BWins
                };
                if let Err(e) = self
                    .ratings
                    .record_result(
                        RatedSide::new(&hero_id, &request.hero.name),
                        RatedSide::new(opponent_id, &outcome.opponent.name),
                        rated,
                    )
                    .await
                {
                    warn!(hero_id = %hero_id, error = %e, "rating update failed, duel left unrated");
                }
            }
            (None, true) => debug!(hero_id = %hero_id, "ranked flag ignored for synthetic opponent"),
            _ => {}
        }

        info!(
            hero_id = %hero_id,
            opponent = %outcome.opponent.name,
            seed,
            victory = outcome.victory,
            turns = outcome.turns,
            "duel resolved"
        );
        Ok(outcome)
    }

    // ========================================================================
    // Matchmaking and lifecycle
    // ========================================================================

    pub async fn enqueue(&self, hero_id: &str, hero_name: &str) -> EngineResult<EnqueueOutcome> {
        self.queue.enqueue(hero_id, hero_name).await
    }

    pub async fn leave_queue(&self, hero_id: &str) -> EngineResult<bool> {
        self.queue.leave(hero_id).await
    }

    pub async fn queue_size(&self) -> EngineResult<usize> {
        self.queue.size().await
    }

    pub async fn get_match(&self, id: Uuid) -> EngineResult<Match> {
        self.lifecycle.get(id).await
    }

    /// Pending or started match the hero belongs to
    pub async fn current_match(&self, hero_id: &str) -> EngineResult<Option<Match>> {
        self.lifecycle.current_for(hero_id).await
    }

    pub async fn start_match(&self, id: Uuid) -> EngineResult<Match> {
        self.lifecycle.start(id).await
    }

    pub async fn complete_match(&self, id: Uuid, result: MatchResult) -> EngineResult<Match> {
        self.lifecycle.complete(id, result).await
    }

    // ========================================================================
    // Ratings and history
    // ========================================================================

    pub async fn get_rating(&self, hero_id: &str) -> i32 {
        self.ratings.rating_of(hero_id).await
    }

    pub async fn leaderboard(&self, limit: usize) -> EngineResult<Vec<LeaderboardEntry>> {
        self.ratings.leaderboard(limit).await
    }

    /// Wins, losses and rewards per hero over the leaderboard window
    pub async fn weekly_leaderboard(&self, limit: usize) -> EngineResult<Vec<WeeklyStanding>> {
        let since = self.clock.now() - self.config.leaderboard_window;
        let events =
            with_timeout(self.config.repository_timeout, self.repo.events_since(since)).await?;

        let mut standings: Vec<WeeklyStanding> = aggregate(&events).into_values().collect();
        standings.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then_with(|| b.xp.cmp(&a.xp))
                .then_with(|| a.hero_id.cmp(&b.hero_id))
        });
        standings.truncate(self.config.page_size(limit));
        Ok(standings)
    }

    /// A hero's duel events, newest first
    pub async fn history(&self, hero_id: &str, limit: usize) -> EngineResult<Vec<DuelEvent>> {
        let limit = self.config.page_size(limit);
        Ok(with_timeout(
            self.config.repository_timeout,
            self.repo.events_for_hero(hero_id, limit),
        )
        .await?)
    }
}

/// Fold outcome-bearing events into per-hero standings. The latest name
/// seen for a hero wins.
fn aggregate(events: &[DuelEvent]) -> FxHashMap<String, WeeklyStanding> {
    let mut standings: FxHashMap<String, WeeklyStanding> = FxHashMap::default();
    for event in events {
        let Some(victory) = event.victory else {
            continue;
        };
        let row = standings
            .entry(event.hero_id.clone())
            .or_insert_with(|| WeeklyStanding {
                hero_id: event.hero_id.clone(),
                hero_name: event.hero_name.clone(),
                wins: 0,
                losses: 0,
                xp: 0,
                gold: 0,
            });
        row.hero_name.clone_from(&event.hero_name);
        if victory {
            row.wins += 1;
        } else {
            row.losses += 1;
        }
        row.xp += u64::from(event.xp);
        row.gold += u64::from(event.gold);
    }
    standings
}
