//! Elo rating engine
//!
//! Both new ratings are computed from the pre-match pair, so the update is
//! symmetric up to independent rounding. Ratings never drop below zero.

use serde::{Deserialize, Serialize};

/// Rating assigned to heroes with no ranked history
pub const DEFAULT_RATING: i32 = 1000;

/// Standard K-factor
pub const K_FACTOR: f64 = 32.0;

/// Lower bound for any rating
pub const RATING_FLOOR: i32 = 0;

/// Which side of a rated pair won
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatedOutcome {
    AWins,
    BWins,
}

impl RatedOutcome {
    fn scores(self) -> (f64, f64) {
        match self {
            RatedOutcome::AWins => (1.0, 0.0),
            RatedOutcome::BWins => (0.0, 1.0),
        }
    }
}

/// Expected score of `rating` against `opponent`
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    let gap = i64::from(opponent) - i64::from(rating);
    1.0 / (1.0 + 10_f64.powf(gap as f64 / 400.0))
}

/// Apply one rated result with the default K-factor
pub fn update_ratings(rating_a: i32, rating_b: i32, outcome: RatedOutcome) -> (i32, i32) {
    update_ratings_with_k(rating_a, rating_b, outcome, K_FACTOR)
}

/// Apply one rated result with a custom K-factor
pub fn update_ratings_with_k(
    rating_a: i32,
    rating_b: i32,
    outcome: RatedOutcome,
    k: f64,
) -> (i32, i32) {
    let expected_a = expected_score(rating_a, rating_b);
    let expected_b = expected_score(rating_b, rating_a);
    let (score_a, score_b) = outcome.scores();

    (
        adjust(rating_a, k * (score_a - expected_a)),
        adjust(rating_b, k * (score_b - expected_b)),
    )
}

fn adjust(rating: i32, delta: f64) -> i32 {
    let updated = (f64::from(rating) + delta).round();
    (updated.min(f64::from(i32::MAX)) as i32).max(RATING_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_equal_ratings_move_sixteen() {
        assert_eq!(update_ratings(1000, 1000, RatedOutcome::AWins), (1016, 984));
        assert_eq!(update_ratings(1000, 1000, RatedOutcome::BWins), (984, 1016));
    }

    #[test]
    fn test_favourite_gains_less() {
        assert_eq!(update_ratings(1200, 1000, RatedOutcome::AWins), (1208, 992));
        assert_eq!(update_ratings(1000, 1200, RatedOutcome::AWins), (1024, 1176));
    }

    #[test]
    fn test_expected_score() {
        assert!((expected_score(1500, 1500) - 0.5).abs() < 1e-12);
        let high = expected_score(1700, 1500);
        assert!(high > 0.7 && high < 0.8);
        assert!((expected_score(1700, 1500) + expected_score(1500, 1700) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(update_ratings(0, 0, RatedOutcome::BWins), (0, 16));
        assert_eq!(update_ratings(5, 1000, RatedOutcome::BWins), (5, 1000));
    }

    #[test]
    fn test_extreme_ratings_do_not_overflow() {
        assert_eq!(expected_score(i32::MIN, i32::MAX), 0.0);
        assert_eq!(
            update_ratings(i32::MIN, i32::MAX, RatedOutcome::AWins),
            (0, i32::MAX - 32)
        );
        assert_eq!(
            update_ratings(i32::MAX, i32::MIN, RatedOutcome::AWins),
            (i32::MAX, 0)
        );
    }

    #[test]
    fn test_random_pairs_are_symmetric_and_non_negative() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        for _ in 0..5_000 {
            let a = rng.gen_range(0..3000);
            let b = rng.gen_range(0..3000);
            let outcome = if rng.gen_bool(0.5) {
                RatedOutcome::AWins
            } else {
                RatedOutcome::BWins
            };
            let (na, nb) = update_ratings(a, b, outcome);
            assert!(na >= 0 && nb >= 0);

            // Away from the floor, gains and losses match up to rounding
            if na > 0 && nb > 0 {
                assert!(((na - a) - (b - nb)).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_update_uses_pre_match_values() {
        let (na, nb) = update_ratings(1400, 1000, RatedOutcome::BWins);
        let expected_b = expected_score(1000, 1400);
        assert_eq!(nb, (1000.0 + 32.0 * (1.0 - expected_b)).round() as i32);
        assert!(na < 1400);
    }
}
