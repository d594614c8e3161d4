//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - resolving suggestion query defaults and running the pipeline
//!   - grading a submission and applying the rating update
//!   - building the opaque pagination cursor

use base64::Engine;
use rand::Rng;
use tracing::{info, instrument};

use crate::domain::EloUpdateResult;
use crate::elo::{self, DEFAULT_RATING};
use crate::evaluate::evaluate;
use crate::protocol::{SubmitIn, SuggestionsOut, SuggestionsQuery};
use crate::seeds::DEFAULT_LEARNER_TOPICS;
use crate::state::AppState;
use crate::suggestions::{SuggestionError, SuggestionRequest};

#[derive(Debug, PartialEq, Eq)]
pub struct MissingFields;

/// Fill query defaults from settings.
pub fn suggestion_request(state: &AppState, q: &SuggestionsQuery) -> SuggestionRequest {
  let s = &state.settings;
  let keywords: Vec<String> = q
    .keywords
    .as_deref()
    .unwrap_or_default()
    .split(',')
    .map(|k| k.trim().to_string())
    .filter(|k| !k.is_empty())
    .collect();

  SuggestionRequest {
    keywords: if keywords.is_empty() {
      DEFAULT_LEARNER_TOPICS.iter().map(|k| k.to_string()).collect()
    } else {
      keywords
    },
    rating: q.rating.unwrap_or(DEFAULT_RATING).max(0),
    limit: q.limit.unwrap_or(s.default_limit).min(s.max_limit),
    native_locale: non_empty(q.native_locale.as_deref()).unwrap_or(&s.default_native_locale).to_string(),
    target_locale: non_empty(q.target_locale.as_deref()).unwrap_or(&s.default_target_locale).to_string(),
  }
}

#[instrument(level = "info", skip(state, q))]
pub async fn get_suggestions(state: &AppState, q: &SuggestionsQuery) -> Result<SuggestionsOut, SuggestionError> {
  let req = suggestion_request(state, q);
  let items = state.pipeline.generate(&req).await?;
  let next_cursor = (req.limit > 0 && items.len() == req.limit).then(next_cursor);
  Ok(SuggestionsOut { items, next_cursor })
}

/// Grade one submission and compute the learner's new rating.
#[instrument(level = "info", skip(body), fields(exercise_type = ?body.exercise_type))]
pub fn submit_answer(body: &SubmitIn) -> Result<EloUpdateResult, MissingFields> {
  let exercise_id = non_empty(body.exercise_id.as_deref()).ok_or(MissingFields)?;
  let kind = non_empty(body.exercise_type.as_deref()).ok_or(MissingFields)?;
  let difficulty = body.difficulty_rating.ok_or(MissingFields)?;
  if body.answer.is_null() || body.correct_answer.is_null() {
    return Err(MissingFields);
  }

  let current = body.current_rating.unwrap_or(DEFAULT_RATING);
  let is_correct = evaluate(kind, &body.answer, &body.correct_answer);
  let result = elo::update(current, difficulty, is_correct);
  info!(target: "grading", %exercise_id, %kind, difficulty, current, is_correct, delta = result.delta_elo, new_elo = result.new_elo, "Answer graded");
  Ok(result)
}

/// Opaque cursor: base64 of `{timestamp, seed}`.
pub fn next_cursor() -> String {
  const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  let mut rng = rand::thread_rng();
  let seed: String = (0..9).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect();
  let payload = serde_json::json!({
    "timestamp": chrono::Utc::now().timestamp_millis(),
    "seed": seed,
  });
  base64::engine::general_purpose::STANDARD.encode(payload.to_string())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
  s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::SuggestionSettings;
  use serde_json::json;

  fn state() -> AppState {
    AppState::with_generator(None, SuggestionSettings::default())
  }

  #[test]
  fn query_defaults_are_filled() {
    let req = suggestion_request(&state(), &SuggestionsQuery::default());
    assert_eq!(req.limit, 5);
    assert_eq!(req.rating, 1000);
    assert_eq!(req.keywords.len(), 5);
    assert_eq!(req.native_locale, "vi");
    assert_eq!(req.target_locale, "en");
  }

  #[test]
  fn query_values_are_capped_and_split() {
    let q = SuggestionsQuery {
      rating: Some(-40),
      limit: Some(50),
      keywords: Some("food, ,travel ".into()),
      native_locale: Some("de".into()),
      target_locale: Some(" ".into()),
    };
    let req = suggestion_request(&state(), &q);
    assert_eq!(req.limit, 10);
    assert_eq!(req.rating, 0);
    assert_eq!(req.keywords, vec!["food".to_string(), "travel".to_string()]);
    assert_eq!(req.native_locale, "de");
    assert_eq!(req.target_locale, "en");
  }

  #[test]
  fn submission_is_graded_and_rated() {
    let body = SubmitIn {
      exercise_id: Some("ex1".into()),
      answer: json!(2),
      exercise_type: Some("mcq".into()),
      difficulty_rating: Some(1000),
      correct_answer: json!({"correctIndex": 2}),
      current_rating: Some(1000),
    };
    let r = submit_answer(&body).unwrap();
    assert!(r.is_correct);
    assert_eq!(r.new_elo, 1016);
  }

  #[test]
  fn submission_without_required_fields_is_rejected() {
    let body = SubmitIn { exercise_id: Some("ex1".into()), answer: json!(1), ..SubmitIn::default() };
    assert_eq!(submit_answer(&body), Err(MissingFields));
  }

  #[test]
  fn cursor_decodes_to_timestamp_and_seed() {
    let raw = base64::engine::general_purpose::STANDARD.decode(next_cursor()).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert!(v["timestamp"].is_i64());
    assert_eq!(v["seed"].as_str().map(str::len), Some(9));
  }
}
