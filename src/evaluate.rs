//! Answer grading. One algorithm per exercise kind; every path resolves to a
//! plain bool and never errors, since a submission must always get an outcome.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::domain::ExerciseKind;

/// Grade `submitted` against the stored `correct` payload (the record's `data`).
///
/// Unknown kinds and malformed payloads grade as incorrect.
pub fn evaluate(kind: &str, submitted: &Value, correct: &Value) -> bool {
  let Some(kind) = ExerciseKind::parse(kind) else {
    debug!(target: "grading", %kind, "Unknown exercise kind; grading as incorrect");
    return false;
  };

  match kind {
    ExerciseKind::Mcq => match (submitted.as_f64(), correct.get("correctIndex").and_then(Value::as_f64)) {
      (Some(got), Some(want)) => got == want,
      _ => false,
    },
    ExerciseKind::TrueFalse => match (submitted.as_bool(), correct.get("correct").and_then(Value::as_bool)) {
      (Some(got), Some(want)) => got == want,
      _ => false,
    },
    ExerciseKind::Match => {
      let got = submitted.as_object().and_then(index_map);
      let want = correct.get("pairs").and_then(Value::as_object).and_then(index_map);
      match (got, want) {
        (Some(got), Some(want)) => got == want,
        _ => false,
      }
    }
    ExerciseKind::Anagram => match (submitted.as_str(), correct.get("target").and_then(Value::as_str)) {
      (Some(got), Some(want)) => got.trim().to_lowercase() == want.trim().to_lowercase(),
      _ => false,
    },
  }
}

/// Read `{ "0": 1, "1": 0 }` as an integer map. Any non-integer key or value
/// invalidates the whole map.
fn index_map(obj: &serde_json::Map<String, Value>) -> Option<BTreeMap<i64, i64>> {
  obj
    .iter()
    .map(|(k, v)| {
      let key = k.trim().parse::<i64>().ok()?;
      let val = match v {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
      };
      Some((key, val))
    })
    .collect()
}
