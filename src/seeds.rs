//! Default topic lists used when a learner has not chosen any keywords.

/// Topics handed to the generator when the caller supplies no keywords.
pub const DEFAULT_GENERATOR_TOPICS: [&str; 10] = [
  "family",
  "work",
  "food",
  "travel",
  "health",
  "shopping",
  "school",
  "weather",
  "transport",
  "daily routines",
];

/// Topics the HTTP layer falls back to for a learner with no saved keywords.
pub const DEFAULT_LEARNER_TOPICS: [&str; 5] = ["family", "work", "food", "travel", "health"];

/// Most keywords forwarded to the generator in one request.
pub const MAX_GENERATOR_KEYWORDS: usize = 10;

/// Trimmed, non-empty keywords capped at `MAX_GENERATOR_KEYWORDS`, or the default
/// topics when nothing usable was given.
pub fn generator_keywords(keywords: &[String]) -> Vec<String> {
  let picked: Vec<String> = keywords
    .iter()
    .map(|k| k.trim())
    .filter(|k| !k.is_empty())
    .take(MAX_GENERATOR_KEYWORDS)
    .map(str::to_string)
    .collect();
  if picked.is_empty() {
    DEFAULT_GENERATOR_TOPICS.iter().map(|s| s.to_string()).collect()
  } else {
    picked
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_keywords_use_all_ten_topics() {
    let k = generator_keywords(&[]);
    assert_eq!(k.len(), 10);
    assert_eq!(k[9], "daily routines");
    assert_eq!(generator_keywords(&["  ".into()]).len(), 10);
  }

  #[test]
  fn keywords_are_trimmed_and_capped() {
    let many: Vec<String> = (0..15).map(|i| format!(" k{i} ")).collect();
    let k = generator_keywords(&many);
    assert_eq!(k.len(), 10);
    assert_eq!(k[0], "k0");
  }
}
