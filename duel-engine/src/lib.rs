//! Duel Engine - matchmaking, match lifecycle and ratings
//!
//! Stateful layer over `duel-core`:
//! - Matchmaking queue that pairs on enqueue by closest rating
//! - Match lifecycle (pending, started, completed) with audit events
//! - Rating book applying Elo updates atomically to both sides
//! - `DuelEngine` facade used by the HTTP server and the CLI
//!
//! Storage is reached only through `DuelRepository`.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod matchmaking;
pub mod model;
pub mod ratings;
pub mod repository;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{DuelEngine, ResolveRequest};
pub use error::{EngineError, EngineResult};
pub use lifecycle::MatchResult;
pub use matchmaking::EnqueueOutcome;
pub use model::{
    DuelEvent, DuelEventKind, LeaderboardEntry, Match, MatchStatus, QueueEntry, Rating,
    WeeklyStanding,
};
pub use repository::{DuelRepository, InMemoryRepository, RecordKind, RepositoryError};
