//! Candidate normalization: the single boundary where loosely-typed generator
//! output becomes an `ExerciseRecord`.
//!
//! A candidate is either fully normalized or rejected (`None`). Rejections are
//! logged at debug and never surface as errors.

use std::collections::BTreeMap;

use rand::Rng;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{ExerciseData, ExerciseKind, ExerciseRecord};
use crate::elo::difficulty_range;

const MIN_ESTIMATED_TIME: i64 = 5;
const MAX_ESTIMATED_TIME: i64 = 600;
const MAX_MCQ_OPTIONS: usize = 8;

/// `exercise_<unix-millis>_<9 base36 chars>`. Unique in practice, not guaranteed.
pub fn generate_exercise_id() -> String {
  const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  let mut rng = rand::thread_rng();
  let suffix: String = (0..9)
    .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
    .collect();
  format!("exercise_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// Validate and canonicalize one raw candidate against the requesting `rating`.
pub fn normalize(raw: &Value, rating: i64) -> Option<ExerciseRecord> {
  let Some(obj) = raw.as_object() else {
    debug!(target: "suggestions", "Rejected candidate: not an object");
    return None;
  };

  let tag = obj.get("type").or_else(|| obj.get("kind")).and_then(Value::as_str);
  let Some(kind) = tag.and_then(ExerciseKind::parse) else {
    debug!(target: "suggestions", kind = ?tag, "Rejected candidate: unknown kind");
    return None;
  };

  let data = match obj.get("data").and_then(Value::as_object) {
    Some(d) => normalize_data(kind, d),
    None => None,
  };
  let Some(data) = data else {
    debug!(target: "suggestions", %kind, "Rejected candidate: payload does not match kind");
    return None;
  };

  let id = match obj.get("id").and_then(Value::as_str) {
    Some(s) if !s.is_empty() => s.to_string(),
    _ => generate_exercise_id(),
  };

  let prompt = obj.get("prompt").and_then(scalar_text).unwrap_or_default();

  let range = difficulty_range(rating);
  let requested = obj.get("difficultyRating").and_then(Value::as_f64).unwrap_or(rating as f64);
  let difficulty_rating = range.clamp(floor_to_i64(requested));
  debug_assert!(range.contains(difficulty_rating));

  let estimated_time = match obj.get("estimatedTime").and_then(Value::as_f64) {
    Some(t) => floor_to_i64(t).clamp(MIN_ESTIMATED_TIME, MAX_ESTIMATED_TIME),
    None => kind.default_estimated_time(),
  };

  let keywords = obj.get("keywords").and_then(Value::as_array).map(|a| text_list(a)).unwrap_or_default();

  Some(ExerciseRecord {
    id,
    kind,
    prompt,
    data,
    difficulty_rating,
    estimated_time,
    keywords,
  })
}

fn normalize_data(kind: ExerciseKind, d: &Map<String, Value>) -> Option<ExerciseData> {
  match kind {
    ExerciseKind::Mcq => {
      let question = d.get("question")?.as_str()?.to_string();
      let mut options = text_list(d.get("options")?.as_array()?);
      if options.is_empty() {
        return None;
      }
      options.truncate(MAX_MCQ_OPTIONS);

      let last = options.len() as i64 - 1;
      let correct_index = match d.get("correctIndex").and_then(Value::as_f64) {
        Some(i) => floor_to_i64(i).clamp(0, last) as usize,
        None => d
          .get("answer")
          .and_then(Value::as_str)
          .and_then(|answer| options.iter().position(|o| o == answer))
          .unwrap_or(0),
      };

      Some(ExerciseData::Mcq { question, options, correct_index })
    }
    ExerciseKind::TrueFalse => {
      let statement = d.get("statement")?.as_str()?.to_string();
      let correct = d
        .get("correct")
        .and_then(Value::as_bool)
        .or_else(|| d.get("answer").and_then(Value::as_bool))?;
      Some(ExerciseData::TrueFalse { statement, correct })
    }
    ExerciseKind::Match => {
      let left = text_list(d.get("left")?.as_array()?);
      let right = text_list(d.get("right")?.as_array()?);
      let pairs = match d.get("pairs") {
        Some(Value::Array(items)) => pairs_from_entries(items),
        Some(Value::Object(map)) => pairs_from_keyed(map),
        _ => {
          // An absent encoding may be a generator bug rather than an identity exercise.
          debug!(target: "suggestions", left = left.len(), right = right.len(), "Match candidate without pairs; using identity pairing");
          (0..left.len().min(right.len()) as i64).map(|i| (i, i)).collect()
        }
      };
      Some(ExerciseData::Match { left, right, pairs })
    }
    ExerciseKind::Anagram => {
      let letters_arr = d.get("letters").and_then(Value::as_array);
      let target = d.get("target").and_then(Value::as_str);
      let scrambled = d.get("scrambled").and_then(Value::as_str);
      let answer = d.get("answer").and_then(Value::as_str);

      let accepted = (letters_arr.is_some() && target.is_some()) || (scrambled.is_some() && answer.is_some());
      if !accepted {
        return None;
      }

      let letters = match letters_arr {
        Some(a) => text_list(a),
        None => scrambled?.chars().map(String::from).collect(),
      };
      let target = target.or(answer)?.to_string();
      Some(ExerciseData::Anagram { letters, target })
    }
  }
}

/// `[{ "i": 0, "v": 1 }, ...]`; later entries overwrite earlier ones.
fn pairs_from_entries(items: &[Value]) -> BTreeMap<i64, i64> {
  items
    .iter()
    .filter_map(|p| {
      let i = p.get("i").and_then(integer_of)?;
      let v = p.get("v").and_then(integer_of)?;
      Some((i, v))
    })
    .collect()
}

/// `{ "0": 1, "1": 0 }`
fn pairs_from_keyed(map: &Map<String, Value>) -> BTreeMap<i64, i64> {
  map
    .iter()
    .filter_map(|(k, v)| Some((k.trim().parse::<i64>().ok()?, integer_of(v)?)))
    .collect()
}

/// Integer value of a JSON number or numeric string. Fractions are rejected.
fn integer_of(v: &Value) -> Option<i64> {
  let f = match v {
    Value::Number(n) => n.as_f64()?,
    Value::String(s) => s.trim().parse::<f64>().ok()?,
    _ => return None,
  };
  (f.is_finite() && f.fract() == 0.0).then(|| f as i64)
}

fn floor_to_i64(v: f64) -> i64 {
  // `as` saturates, which is what the later clamps want.
  v.floor() as i64
}

/// Strings as-is, numbers and bools as their JSON text, everything else dropped.
fn scalar_text(v: &Value) -> Option<String> {
  match v {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

fn text_list(items: &[Value]) -> Vec<String> {
  items
    .iter()
    .map(|v| scalar_text(v).unwrap_or_else(|| v.to_string()))
    .collect()
}
