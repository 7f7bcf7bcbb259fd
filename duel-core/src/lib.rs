//! Duel Core - deterministic combat and ratings
//!
//! This crate provides the pure rules of the duel arena:
//! - Seeded RNG (mulberry32) that replays a duel from its seed
//! - Elemental affinities and the advantage cycle
//! - Combat resolution with initiative, ramp and freeze
//! - Level-scaled synthetic opponents
//! - Elo rating updates
//!
//! Nothing here performs I/O.

pub mod combat;
pub mod combatant;
pub mod element;
pub mod error;
pub mod opponent;
pub mod rating;
pub mod rng;

// Re-exports for convenient access
pub use combat::{resolve, resolve_with_element, rewards, CombatOutcome, Finish, Rewards, Side, MAX_TURNS};
pub use combatant::{Combatant, HeroSnapshot};
pub use element::Element;
pub use error::DuelError;
pub use opponent::synthesize_opponent;
pub use rating::{expected_score, update_ratings, update_ratings_with_k, RatedOutcome, DEFAULT_RATING, K_FACTOR};
pub use rng::DuelRng;
