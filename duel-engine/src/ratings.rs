//! Rating book: reads and writes Elo rows through the repository

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use duel_core::{update_ratings_with_k, RatedOutcome};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{LeaderboardEntry, Rating};
use crate::repository::{with_timeout, DuelRepository, RepoResult};

/// One participant of a rated result
#[derive(Clone, Copy, Debug)]
pub struct RatedSide<'a> {
    pub hero_id: &'a str,
    pub hero_name: &'a str,
}

impl<'a> RatedSide<'a> {
    pub fn new(hero_id: &'a str, hero_name: &'a str) -> Self {
        Self { hero_id, hero_name }
    }
}

pub struct RatingBook {
    repo: Arc<dyn DuelRepository>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl RatingBook {
    pub fn new(repo: Arc<dyn DuelRepository>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self { repo, clock, config }
    }

    /// Current ratings for `hero_ids`; heroes without a row get the default
    pub async fn ratings_of(&self, hero_ids: &[String]) -> RepoResult<FxHashMap<String, i32>> {
        let rows = with_timeout(self.config.repository_timeout, self.repo.get_ratings(hero_ids)).await?;
        let mut ratings: FxHashMap<String, i32> = hero_ids
            .iter()
            .map(|id| (id.clone(), self.config.default_rating))
            .collect();
        for row in rows {
            ratings.insert(row.hero_id, row.rating);
        }
        Ok(ratings)
    }

    /// Rating of one hero. Lookup failures degrade to the default rating.
    pub async fn rating_of(&self, hero_id: &str) -> i32 {
        let ids = [hero_id.to_string()];
        match self.ratings_of(&ids).await {
            Ok(ratings) => ratings
                .get(hero_id)
                .copied()
                .unwrap_or(self.config.default_rating),
            Err(e) => {
                warn!(hero_id = %hero_id, error = %e, "rating lookup failed, using default");
                self.config.default_rating
            }
        }
    }

    /// Apply one rated result and persist both rows in a single write.
    ///
    /// Unlike `rating_of`, a failed lookup here is an error: writing an
    /// update computed from the default would overwrite a real rating.
    pub async fn record_result(
        &self,
        a: RatedSide<'_>,
        b: RatedSide<'_>,
        outcome: RatedOutcome,
    ) -> EngineResult<(Rating, Rating)> {
        if a.hero_id == b.hero_id {
            return Err(EngineError::Validation(format!(
                "hero {} cannot be rated against itself",
                a.hero_id
            )));
        }

        let ids = [a.hero_id.to_string(), b.hero_id.to_string()];
        let current = self.ratings_of(&ids).await?;
        let before_a = current.get(a.hero_id).copied().unwrap_or(self.config.default_rating);
        let before_b = current.get(b.hero_id).copied().unwrap_or(self.config.default_rating);

        let (after_a, after_b) =
            update_ratings_with_k(before_a, before_b, outcome, self.config.k_factor);

        let now = self.clock.now();
        let row_a = Rating {
            hero_id: a.hero_id.to_string(),
            hero_name: a.hero_name.to_string(),
            rating: after_a,
            updated_at: now,
        };
        let row_b = Rating {
            hero_id: b.hero_id.to_string(),
            hero_name: b.hero_name.to_string(),
            rating: after_b,
            updated_at: now,
        };

        with_timeout(
            self.config.repository_timeout,
            self.repo.upsert_ratings(vec![row_a.clone(), row_b.clone()]),
        )
        .await?;

        debug!(
            hero_a = %a.hero_id,
            hero_b = %b.hero_id,
            before_a,
            before_b,
            after_a,
            after_b,
            "ratings updated"
        );
        Ok((row_a, row_b))
    }

    /// Highest ratings first
    pub async fn leaderboard(&self, limit: usize) -> EngineResult<Vec<LeaderboardEntry>> {
        let limit = self.config.page_size(limit);
        let rows = with_timeout(self.config.repository_timeout, self.repo.top_ratings(limit)).await?;
        Ok(rows.into_iter().map(LeaderboardEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::repository::{InMemoryRepository, RecordKind};

    fn book() -> (RatingBook, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let book = RatingBook::new(
            repo.clone(),
            Arc::new(ManualClock::default()),
            EngineConfig::default(),
        );
        (book, repo)
    }

    #[tokio::test]
    async fn test_unrated_hero_gets_default() {
        let (book, _) = book();
        assert_eq!(book.rating_of("nobody").await, 1000);
    }

    #[tokio::test]
    async fn test_record_result_updates_both_sides() {
        let (book, _) = book();
        let (a, b) = book
            .record_result(
                RatedSide::new("a", "Aria"),
                RatedSide::new("b", "Brann"),
                RatedOutcome::AWins,
            )
            .await
            .unwrap();
        assert_eq!((a.rating, b.rating), (1016, 984));
        assert_eq!(book.rating_of("a").await, 1016);
        assert_eq!(book.rating_of("b").await, 984);

        let board = book.leaderboard(10).await.unwrap();
        assert_eq!(board[0].hero_name, "Aria");
        assert_eq!(board[1].rating, 984);
    }

    #[tokio::test]
    async fn test_second_result_uses_stored_ratings() {
        let (book, _) = book();
        let a = RatedSide::new("a", "Aria");
        let b = RatedSide::new("b", "Brann");
        book.record_result(a, b, RatedOutcome::AWins).await.unwrap();
        let (na, nb) = book.record_result(a, b, RatedOutcome::AWins).await.unwrap();
        let (ea, eb) = duel_core::update_ratings(1016, 984, RatedOutcome::AWins);
        assert_eq!((na.rating, nb.rating), (ea, eb));
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_to_default() {
        let (book, repo) = book();
        book.record_result(
            RatedSide::new("a", "Aria"),
            RatedSide::new("b", "Brann"),
            RatedOutcome::BWins,
        )
        .await
        .unwrap();

        repo.set_offline(RecordKind::Ratings, true);
        assert_eq!(book.rating_of("b").await, 1000);

        let err = book
            .record_result(
                RatedSide::new("a", "Aria"),
                RatedSide::new("b", "Brann"),
                RatedOutcome::AWins,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Dependency(_)));

        repo.set_offline(RecordKind::Ratings, false);
        assert_eq!(book.rating_of("b").await, 1016);
    }

    #[tokio::test]
    async fn test_self_rating_rejected() {
        let (book, _) = book();
        let side = RatedSide::new("a", "Aria");
        let err = book.record_result(side, side, RatedOutcome::AWins).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
