//! Server state
//!
//! Handlers share one engine; all mutable state lives behind its repository.

use std::time::Instant;

use duel_engine::{DuelEngine, EngineConfig};

/// Server-wide shared state
pub struct ServerState {
    pub engine: DuelEngine,
    pub started: Instant,
}

impl ServerState {
    pub fn new(engine: DuelEngine) -> Self {
        Self {
            engine,
            started: Instant::now(),
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(DuelEngine::in_memory(EngineConfig::default()))
    }
}
