//! Persisted records: queue entries, matches, ratings and duel events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use duel_core::DEFAULT_RATING;

/// A hero waiting in the matchmaking queue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub hero_id: String,
    pub hero_name: String,
    pub enqueued_at: DateTime<Utc>,
}

/// Match lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Started,
    Completed,
}

impl MatchStatus {
    /// Forward-only transitions. Re-entering the same state is allowed so
    /// retries stay idempotent; pending may complete directly.
    pub fn can_transition_to(&self, to: &MatchStatus) -> bool {
        match (self, to) {
            (MatchStatus::Pending, MatchStatus::Started) => true,
            (MatchStatus::Pending, MatchStatus::Completed) => true,
            (MatchStatus::Started, MatchStatus::Completed) => true,
            (a, b) if a == b => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "pending"),
            MatchStatus::Started => write!(f, "started"),
            MatchStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A pairing between two heroes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub hero_a_id: String,
    pub hero_a_name: String,
    pub hero_b_id: String,
    pub hero_b_name: String,
    pub status: MatchStatus,
    pub ranked: bool,
    pub winner_id: Option<String>,
    pub duration_ms: Option<u64>,
    pub xp_awarded: Option<u32>,
    pub gold_awarded: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// New ranked match in `pending`
    pub fn pending(a: &QueueEntry, b: &QueueEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            hero_a_id: a.hero_id.clone(),
            hero_a_name: a.hero_name.clone(),
            hero_b_id: b.hero_id.clone(),
            hero_b_name: b.hero_name.clone(),
            status: MatchStatus::Pending,
            ranked: true,
            winner_id: None,
            duration_ms: None,
            xp_awarded: None,
            gold_awarded: None,
            created_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn involves(&self, hero_id: &str) -> bool {
        self.hero_a_id == hero_id || self.hero_b_id == hero_id
    }

    /// (id, name) of both sides, A first
    pub fn sides(&self) -> [(&str, &str); 2] {
        [
            (&self.hero_a_id, &self.hero_a_name),
            (&self.hero_b_id, &self.hero_b_name),
        ]
    }
}

/// Per-hero Elo score
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub hero_id: String,
    pub hero_name: String,
    pub rating: i32,
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    /// Row for a hero with no ranked history yet
    pub fn initial(hero_id: &str, hero_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            hero_id: hero_id.to_string(),
            hero_name: hero_name.to_string(),
            rating: DEFAULT_RATING,
            updated_at: now,
        }
    }
}

/// Kind of audit record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelEventKind {
    /// A queued match was started
    Start,
    /// Opponent-side record of a direct resolve
    Result,
    /// Hero-side record of a direct resolve
    Resolved,
    /// One side of a completed match
    MatchComplete,
}

/// Append-only audit record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelEvent {
    pub id: Uuid,
    pub kind: DuelEventKind,
    pub hero_id: String,
    pub hero_name: String,
    pub opponent_name: String,
    pub match_id: Option<Uuid>,
    /// Outcome from this hero's point of view; none for starts
    pub victory: Option<bool>,
    pub xp: u32,
    pub gold: u32,
    pub seed: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl DuelEvent {
    pub fn new(
        kind: DuelEventKind,
        hero_id: &str,
        hero_name: &str,
        opponent_name: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            hero_id: hero_id.to_string(),
            hero_name: hero_name.to_string(),
            opponent_name: opponent_name.to_string(),
            match_id: None,
            victory: None,
            xp: 0,
            gold: 0,
            seed: None,
            created_at,
        }
    }

    pub fn for_match(mut self, match_id: Uuid) -> Self {
        self.match_id = Some(match_id);
        self
    }

    pub fn with_result(mut self, victory: bool, xp: u32, gold: u32) -> Self {
        self.victory = Some(victory);
        self.xp = xp;
        self.gold = gold;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One row of the rating leaderboard
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub hero_id: String,
    pub hero_name: String,
    pub rating: i32,
}

impl From<Rating> for LeaderboardEntry {
    fn from(rating: Rating) -> Self {
        Self {
            hero_id: rating.hero_id,
            hero_name: rating.hero_name,
            rating: rating.rating,
        }
    }
}

/// One row of the weekly leaderboard, aggregated from duel events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStanding {
    pub hero_id: String,
    pub hero_name: String,
    pub wins: u32,
    pub losses: u32,
    pub xp: u64,
    pub gold: u64,
}
