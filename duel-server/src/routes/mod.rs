//! HTTP route handlers

pub mod duel;
pub mod heroes;
pub mod matches;
pub mod matchmaking;
pub mod ratings;
pub mod status;

use serde::Deserialize;

/// `?limit=N` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn limit_or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default)
    }
}
