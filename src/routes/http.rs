//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::logic::{get_suggestions, submit_answer};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, generator: state.pipeline.is_available() })
}

#[instrument(level = "info", skip(state), fields(rating = ?q.rating, limit = ?q.limit))]
pub async fn http_get_suggestions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SuggestionsQuery>,
) -> Response {
  match get_suggestions(&state, &q).await {
    Ok(out) => {
      info!(target: "suggestions", items = out.items.len(), has_cursor = out.next_cursor.is_some(), "HTTP suggestions served");
      Json(out).into_response()
    }
    Err(e) => {
      warn!(target: "suggestions", error = %e, "HTTP suggestions unavailable");
      (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorOut { error: "Suggestions unavailable".into() })).into_response()
    }
  }
}

#[instrument(level = "info", skip(body), fields(exercise_id = ?body.exercise_id))]
pub async fn http_post_submit(Json(body): Json<SubmitIn>) -> Response {
  match submit_answer(&body) {
    Ok(result) => Json(result).into_response(),
    Err(_) => (StatusCode::BAD_REQUEST, Json(ErrorOut { error: "Missing required fields".into() })).into_response(),
  }
}
