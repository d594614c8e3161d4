//! Suggestion pipeline: one generator call, per-candidate normalization,
//! batch deduplication, and the `limit` cap.
//!
//! The only error surfaced to callers is `SuggestionError::Unavailable`. A
//! batch shorter than `limit` is a success.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::domain::{ExerciseKind, ExerciseRecord};
use crate::generator::{ExerciseGenerator, GeneratorRequest};
use crate::normalize::normalize;
use crate::seeds::generator_keywords;

#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
  #[error("suggestions unavailable: {reason}")]
  Unavailable { reason: String },
}

/// Caller-side parameters for one batch.
#[derive(Clone, Debug)]
pub struct SuggestionRequest {
  pub keywords: Vec<String>,
  pub rating: i64,
  pub limit: usize,
  pub native_locale: String,
  pub target_locale: String,
}

#[derive(Clone)]
pub struct SuggestionPipeline {
  generator: Option<Arc<dyn ExerciseGenerator>>,
}

impl SuggestionPipeline {
  /// `None` means no generator credential is configured; every call will be unavailable.
  pub fn new(generator: Option<Arc<dyn ExerciseGenerator>>) -> Self {
    Self { generator }
  }

  pub fn is_available(&self) -> bool {
    self.generator.is_some()
  }

  #[instrument(level = "info", skip(self, req), fields(rating = req.rating, limit = req.limit, keywords = req.keywords.len()))]
  pub async fn generate(&self, req: &SuggestionRequest) -> Result<Vec<ExerciseRecord>, SuggestionError> {
    let Some(generator) = &self.generator else {
      error!(target: "suggestions", "No generator configured; suggestions unavailable");
      return Err(SuggestionError::Unavailable { reason: "generator credential not set".into() });
    };
    if req.limit == 0 {
      return Ok(Vec::new());
    }

    let gen_req = GeneratorRequest {
      limit: req.limit,
      rating: req.rating,
      keywords: generator_keywords(&req.keywords),
      native_locale: req.native_locale.clone(),
      target_locale: req.target_locale.clone(),
    };

    let candidates = generator.generate(&gen_req).await.map_err(|e| {
      error!(target: "suggestions", error = %e, "Generator call failed");
      SuggestionError::Unavailable { reason: e.to_string() }
    })?;

    let mut accepted = Vec::with_capacity(req.limit);
    let mut scanned = 0usize;
    for raw in &candidates {
      if accepted.len() >= req.limit {
        break;
      }
      scanned += 1;
      if let Some(item) = normalize(raw, req.rating) {
        accepted.push(item);
      }
    }

    let normalized = accepted.len();
    let mut items = dedupe(accepted);
    items.truncate(req.limit);

    info!(
      target: "suggestions",
      received = candidates.len(),
      scanned,
      normalized,
      returned = items.len(),
      "Suggestion batch ready"
    );
    Ok(items)
  }
}

/// Drop later records whose `id` or `(kind, prompt)` was already seen.
pub fn dedupe(items: Vec<ExerciseRecord>) -> Vec<ExerciseRecord> {
  let mut by_id: HashSet<String> = HashSet::new();
  let mut by_key: HashSet<(ExerciseKind, String)> = HashSet::new();
  let mut out = Vec::with_capacity(items.len());

  for it in items {
    let key = (it.kind, it.prompt.clone());
    if by_id.contains(&it.id) || by_key.contains(&key) {
      debug!(target: "suggestions", id = %it.id, kind = %it.kind, "Dropped duplicate exercise");
      continue;
    }
    by_id.insert(it.id.clone());
    by_key.insert(key);
    out.push(it);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::elo::difficulty_range;
  use crate::generator::GeneratorError;
  use async_trait::async_trait;
  use serde_json::{json, Value};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;

  struct StubGenerator {
    output: Result<Vec<Value>, String>,
    calls: AtomicUsize,
    seen: Mutex<Option<GeneratorRequest>>,
  }

  impl StubGenerator {
    fn ok(items: Vec<Value>) -> Arc<Self> {
      Arc::new(Self { output: Ok(items), calls: AtomicUsize::new(0), seen: Mutex::new(None) })
    }

    fn failing(msg: &str) -> Arc<Self> {
      Arc::new(Self { output: Err(msg.into()), calls: AtomicUsize::new(0), seen: Mutex::new(None) })
    }
  }

  #[async_trait]
  impl ExerciseGenerator for StubGenerator {
    async fn generate(&self, request: &GeneratorRequest) -> Result<Vec<Value>, GeneratorError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      *self.seen.lock().unwrap() = Some(request.clone());
      self.output.clone().map_err(GeneratorError::Network)
    }
  }

  fn tf(id: &str, prompt: &str, difficulty: i64) -> Value {
    json!({
      "id": id, "type": "true_false", "prompt": prompt,
      "difficultyRating": difficulty, "estimatedTime": 2000,
      "data": {"statement": format!("statement {prompt}"), "correct": true}
    })
  }

  fn request(limit: usize) -> SuggestionRequest {
    SuggestionRequest {
      keywords: vec![],
      rating: 1000,
      limit,
      native_locale: "vi".into(),
      target_locale: "en".into(),
    }
  }

  #[tokio::test]
  async fn returns_exactly_limit_valid_distinct_items() {
    let items = (0..8).map(|i| tf(&format!("id{i}"), &format!("p{i}"), 500 + i * 200)).collect();
    let stub = StubGenerator::ok(items);
    let pipeline = SuggestionPipeline::new(Some(stub.clone()));

    let out = pipeline.generate(&request(5)).await.unwrap();
    assert_eq!(out.len(), 5);

    let range = difficulty_range(1000);
    let ids: HashSet<_> = out.iter().map(|r| r.id.clone()).collect();
    let keys: HashSet<_> = out.iter().map(|r| (r.kind, r.prompt.clone())).collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(keys.len(), 5);
    for r in &out {
      assert!(range.contains(r.difficulty_rating));
      assert!((5..=600).contains(&r.estimated_time));
    }
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn invalid_candidates_are_skipped_not_errors() {
    let items = vec![
      json!({"type": "essay"}),
      tf("a", "p1", 1000),
      json!({"type": "mcq", "data": {"question": "q", "options": []}}),
      tf("b", "p2", 1000),
    ];
    let pipeline = SuggestionPipeline::new(Some(StubGenerator::ok(items)));
    let out = pipeline.generate(&request(4)).await.unwrap();
    assert_eq!(out.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
  }

  #[tokio::test]
  async fn duplicates_are_dropped_first_wins() {
    let items = vec![
      tf("a", "same", 1000),
      tf("a", "other", 1000),
      tf("c", "same", 1000),
      tf("d", "fresh", 1000),
    ];
    let pipeline = SuggestionPipeline::new(Some(StubGenerator::ok(items)));
    let out = pipeline.generate(&request(4)).await.unwrap();
    assert_eq!(out.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["a", "d"]);
    assert_eq!(out[0].prompt, "same");
  }

  #[tokio::test]
  async fn no_generator_is_unavailable() {
    let pipeline = SuggestionPipeline::new(None);
    assert!(!pipeline.is_available());
    let err = pipeline.generate(&request(3)).await.unwrap_err();
    assert!(matches!(err, SuggestionError::Unavailable { .. }));
  }

  #[tokio::test]
  async fn generator_failure_is_unavailable() {
    let stub = StubGenerator::failing("connection reset");
    let pipeline = SuggestionPipeline::new(Some(stub.clone()));
    let err = pipeline.generate(&request(3)).await.unwrap_err();
    assert!(err.to_string().contains("connection reset"));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn default_topics_and_locales_reach_generator() {
    let stub = StubGenerator::ok(vec![]);
    let pipeline = SuggestionPipeline::new(Some(stub.clone()));
    let out = pipeline.generate(&request(2)).await.unwrap();
    assert!(out.is_empty());

    let seen = stub.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.keywords.len(), 10);
    assert_eq!(seen.limit, 2);
    assert_eq!(seen.rating, 1000);
    assert_eq!(seen.native_locale, "vi");
    assert_eq!(seen.target_locale, "en");
  }

  #[tokio::test]
  async fn zero_limit_skips_the_call() {
    let stub = StubGenerator::ok(vec![tf("a", "p", 1000)]);
    let pipeline = SuggestionPipeline::new(Some(stub.clone()));
    assert!(pipeline.generate(&request(0)).await.unwrap().is_empty());
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
  }
}
