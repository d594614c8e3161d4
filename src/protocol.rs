//! Public protocol structs for HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ExerciseRecord;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub rating: Option<i64>,
    pub limit: Option<usize>,
    /// Comma-separated.
    pub keywords: Option<String>,
    pub native_locale: Option<String>,
    pub target_locale: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsOut {
    pub items: Vec<ExerciseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Answer submission. `correctAnswer` is the served record's `data`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIn {
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub answer: Value,
    #[serde(default)]
    pub exercise_type: Option<String>,
    #[serde(default)]
    pub difficulty_rating: Option<i64>,
    #[serde(default)]
    pub correct_answer: Value,
    /// Learner rating before this answer; the app does not store ratings.
    #[serde(default)]
    pub current_rating: Option<i64>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub generator: bool,
}
