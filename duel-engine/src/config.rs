//! Engine configuration
//!
//! Defaults match the live arena; tests and the CLI override individual
//! fields through the `with_*` builders.

use chrono::Duration;

use duel_core::{DEFAULT_RATING, K_FACTOR};

/// Tunables for matchmaking, ratings and completion clamps
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Queue entries older than this are evicted
    pub queue_ttl: Duration,
    /// Only entries younger than this are pairing candidates
    pub fresh_window: Duration,
    /// Candidates considered per enqueue
    pub max_candidates: usize,
    pub k_factor: f64,
    pub default_rating: i32,
    /// Upper bound on any single repository call
    pub repository_timeout: std::time::Duration,
    /// Window for the weekly leaderboard
    pub leaderboard_window: Duration,
    pub max_xp: u32,
    pub max_gold: u32,
    pub max_duration_ms: u64,
    /// Hard cap on leaderboard and history page sizes
    pub max_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_ttl: Duration::minutes(3),
            fresh_window: Duration::seconds(60),
            max_candidates: 10,
            k_factor: K_FACTOR,
            default_rating: DEFAULT_RATING,
            repository_timeout: std::time::Duration::from_secs(3),
            leaderboard_window: Duration::days(7),
            max_xp: 5_000,
            max_gold: 100_000,
            max_duration_ms: 86_400_000,
            max_page_size: 100,
        }
    }
}

impl EngineConfig {
    pub fn with_queue_ttl(mut self, ttl: Duration) -> Self {
        self.queue_ttl = ttl;
        self
    }

    pub fn with_fresh_window(mut self, window: Duration) -> Self {
        self.fresh_window = window;
        self
    }

    pub fn with_k_factor(mut self, k: f64) -> Self {
        self.k_factor = k;
        self
    }

    pub fn with_repository_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.repository_timeout = timeout;
        self
    }

    /// Clamp a requested page size into `1..=max_page_size`
    pub fn page_size(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_page_size.max(1))
    }
}
