//! Elo-style rating engine: expectation, K-factor schedule, rating update and
//! the difficulty band used to place generated exercises.
//!
//! Everything here is a pure function of its inputs.

use crate::domain::{DifficultyRange, EloUpdateResult};

/// Rating a new learner starts from.
pub const DEFAULT_RATING: i64 = 1000;

/// Half-width of the difficulty band around a learner rating.
const BAND_HALF_WIDTH: i64 = 150;

/// Hardest difficulty a generated exercise can carry.
const MAX_DIFFICULTY: i64 = 3000;

/// Logistic expectation that `subject_rating` beats an item rated `item_rating`.
pub fn expected_score(subject_rating: f64, item_rating: f64) -> f64 {
  1.0 / (1.0 + 10.0_f64.powf((item_rating - subject_rating) / 400.0))
}

/// Volatility schedule. 1000 and 1600 both belong to the middle band.
pub fn k_factor(rating: i64) -> i64 {
  if rating < 1000 {
    40
  } else if rating > 1600 {
    24
  } else {
    32
  }
}

/// Apply one graded answer to a learner rating.
///
/// The resulting rating is floored at zero and saturates at `i64::MAX`.
pub fn update(subject_rating: i64, item_rating: i64, is_correct: bool) -> EloUpdateResult {
  let actual = if is_correct { 1.0 } else { 0.0 };
  let expected = expected_score(subject_rating as f64, item_rating as f64);
  let delta_elo = round_delta(k_factor(subject_rating) as f64 * (actual - expected));
  let new_elo = subject_rating.saturating_add(delta_elo).max(0);

  EloUpdateResult { is_correct, delta_elo, new_elo }
}

/// Half away from zero: `2.5 -> 3`, `-2.5 -> -3`.
fn round_delta(raw: f64) -> i64 {
  raw.round() as i64
}

/// Difficulty band for a rating: `[rating - 150, rating + 150]` intersected with `[0, 3000]`.
///
/// Ratings above 3150 would invert the band; `min` is pinned to `max` there so
/// the band is never empty.
pub fn difficulty_range(rating: i64) -> DifficultyRange {
  let max = rating.saturating_add(BAND_HALF_WIDTH).min(MAX_DIFFICULTY);
  let min = rating.saturating_sub(BAND_HALF_WIDTH).max(0).min(max.max(0));
  DifficultyRange { min, max: max.max(min) }
}
