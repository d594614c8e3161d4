//! Domain models: exercise kinds, their payloads, the canonical exercise record,
//! and the small value types produced by the rating engine.

use std::collections::BTreeMap;

use serde::Serialize;

/// Closed set of exercise kinds the app can serve and grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
  Mcq,
  TrueFalse,
  Match,
  Anagram,
}

impl ExerciseKind {
  pub const ALL: [ExerciseKind; 4] = [
    ExerciseKind::Mcq,
    ExerciseKind::TrueFalse,
    ExerciseKind::Match,
    ExerciseKind::Anagram,
  ];

  /// Parse the wire tag (`mcq`, `true_false`, `match`, `anagram`). Anything else is `None`.
  pub fn parse(tag: &str) -> Option<Self> {
    match tag {
      "mcq" => Some(ExerciseKind::Mcq),
      "true_false" => Some(ExerciseKind::TrueFalse),
      "match" => Some(ExerciseKind::Match),
      "anagram" => Some(ExerciseKind::Anagram),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ExerciseKind::Mcq => "mcq",
      ExerciseKind::TrueFalse => "true_false",
      ExerciseKind::Match => "match",
      ExerciseKind::Anagram => "anagram",
    }
  }

  /// Seconds a learner is expected to spend when the generator gave no estimate.
  pub fn default_estimated_time(&self) -> i64 {
    match self {
      ExerciseKind::Mcq => 30,
      ExerciseKind::TrueFalse => 15,
      ExerciseKind::Match => 60,
      ExerciseKind::Anagram => 45,
    }
  }
}

impl std::fmt::Display for ExerciseKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Kind-specific payload. Serialized without a tag: the kind lives on the record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExerciseData {
  #[serde(rename_all = "camelCase")]
  Mcq {
    question: String,
    options: Vec<String>,
    correct_index: usize,
  },
  TrueFalse {
    statement: String,
    correct: bool,
  },
  Match {
    left: Vec<String>,
    right: Vec<String>,
    /// left index -> right index
    pairs: BTreeMap<i64, i64>,
  },
  Anagram {
    letters: Vec<String>,
    target: String,
  },
}

/// Validated exercise, safe to serve and to grade later.
///
/// Only `normalize::normalize` builds these, so every field already satisfies
/// its range and shape constraints.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: ExerciseKind,
  pub prompt: String,
  pub data: ExerciseData,
  pub difficulty_rating: i64,
  pub estimated_time: i64,
  pub keywords: Vec<String>,
}

/// Inclusive difficulty band derived from a learner rating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DifficultyRange {
  pub min: i64,
  pub max: i64,
}

impl DifficultyRange {
  pub fn clamp(&self, value: i64) -> i64 {
    value.max(self.min).min(self.max)
  }

  pub fn contains(&self, value: i64) -> bool {
    value >= self.min && value <= self.max
  }
}

/// Outcome of grading one submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EloUpdateResult {
  pub is_correct: bool,
  pub delta_elo: i64,
  pub new_elo: i64,
}
