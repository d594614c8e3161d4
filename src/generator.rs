//! Exercise generator collaborator.
//!
//! `ExerciseGenerator` is the seam the suggestion pipeline talks to. The only
//! production implementation calls an OpenAI-compatible chat.completions
//! endpoint in JSON-object mode and hands back the raw, untrusted candidates.
//! Calls log model name, latency and token usage, never the API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::ExerciseKind;
use crate::elo::difficulty_range;
use crate::util::{fill_template, trunc_for_log};

/// What the pipeline asks the generator for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorRequest {
  pub limit: usize,
  pub rating: i64,
  /// 1..=10 topics.
  pub keywords: Vec<String>,
  pub native_locale: String,
  pub target_locale: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
  #[error("generator network error: {0}")]
  Network(String),
  #[error("generator http error: status={status}, message={message}")]
  Http { status: u16, message: String },
  #[error("generator output malformed: {0}")]
  Malformed(String),
}

#[async_trait]
pub trait ExerciseGenerator: Send + Sync {
  /// One batch of raw candidate objects. Shapes are not trusted.
  async fn generate(&self, request: &GeneratorRequest) -> Result<Vec<Value>, GeneratorError>;
}

#[derive(Clone)]
pub struct OpenAiGenerator {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub prompts: Prompts,
}

impl OpenAiGenerator {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(prompts: Prompts) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .unwrap_or(30);

    let client = match reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .build()
    {
      Ok(c) => c,
      Err(e) => {
        error!(target: "practice_backend", error = %e, "Failed to build HTTP client; generator disabled");
        return None;
      }
    };

    Some(Self { client, api_key, base_url, model, prompts })
  }

  /// JSON-object chat completion; returns the raw message content.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json(&self, system: &str, user: &str, temperature: f32) -> Result<String, GeneratorError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "practice-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| GeneratorError::Network(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(GeneratorError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| GeneratorError::Malformed(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    Ok(body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default())
  }
}

#[async_trait]
impl ExerciseGenerator for OpenAiGenerator {
  #[instrument(level = "info", skip(self, request), fields(limit = request.limit, rating = request.rating, keywords = request.keywords.len()))]
  async fn generate(&self, request: &GeneratorRequest) -> Result<Vec<Value>, GeneratorError> {
    let (system, user) = build_messages(&self.prompts, request);
    let start = std::time::Instant::now();
    let result = self.chat_json(&system, &user, 0.7).await;
    let elapsed = start.elapsed();

    let text = match result {
      Ok(t) => t,
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during exercise generation");
        return Err(e);
      }
    };

    let candidates = parse_candidates(&text).map_err(|e| {
      warn!(?elapsed, output = %trunc_for_log(&text, 300), "Generator output could not be read as a candidate list");
      e
    })?;
    info!(?elapsed, candidates = candidates.len(), "Model response received successfully");
    Ok(candidates)
  }
}

/// System + user messages for one generation call.
pub fn build_messages(prompts: &Prompts, request: &GeneratorRequest) -> (String, String) {
  let range = difficulty_range(request.rating);
  let limit = request.limit.to_string();
  let min = range.min.to_string();
  let max = range.max.to_string();
  let kinds = ExerciseKind::ALL.iter().map(ExerciseKind::as_str).collect::<Vec<_>>().join(", ");
  let vars = [
    ("limit", limit.as_str()),
    ("min", min.as_str()),
    ("max", max.as_str()),
    ("kinds", kinds.as_str()),
    ("native_locale", request.native_locale.as_str()),
    ("target_locale", request.target_locale.as_str()),
  ];

  let system = fill_template(&prompts.suggestion_system, &vars);
  let instructions = fill_template(&prompts.suggestion_user_template, &vars);
  let payload = serde_json::json!({
    "nativeLanguage": request.native_locale,
    "targetLanguage": request.target_locale,
    "elo": request.rating,
    "limit": request.limit,
    "keywords": request.keywords,
    "diversity": true,
  });
  (system, format!("{instructions}\nRequest: {payload}"))
}

/// Accept a top-level array, or an object wrapping the array in `items`/`exercises`.
pub fn parse_candidates(text: &str) -> Result<Vec<Value>, GeneratorError> {
  let value: Value = serde_json::from_str(text.trim())
    .map_err(|e| GeneratorError::Malformed(format!("JSON parse error: {e}")))?;
  match value {
    Value::Array(items) => Ok(items),
    Value::Object(mut obj) => match obj.remove("items").or_else(|| obj.remove("exercises")) {
      Some(Value::Array(items)) => Ok(items),
      _ => Err(GeneratorError::Malformed("expected an `items` array".into())),
    },
    _ => Err(GeneratorError::Malformed("expected a sequence of exercises".into())),
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request() -> GeneratorRequest {
    GeneratorRequest {
      limit: 4,
      rating: 1000,
      keywords: vec!["food".into(), "travel".into()],
      native_locale: "vi".into(),
      target_locale: "en".into(),
    }
  }

  #[test]
  fn messages_carry_band_count_and_keywords() {
    let (system, user) = build_messages(&Prompts::default(), &request());
    assert!(system.contains("en"));
    assert!(user.contains("exactly 4 items"));
    assert!(user.contains("[850, 1150]"));
    assert!(user.contains("mcq, true_false, match, anagram"));
    assert!(user.contains("\"keywords\":[\"food\",\"travel\"]"));
    assert!(!user.contains("{limit}"));
  }

  #[test]
  fn candidates_accept_array_or_wrapped_array() {
    assert_eq!(parse_candidates(r#"[{"type":"mcq"}]"#).unwrap().len(), 1);
    assert_eq!(parse_candidates(r#"{"items":[{},{}]}"#).unwrap().len(), 2);
    assert_eq!(parse_candidates(r#"{"exercises":[]}"#).unwrap().len(), 0);
  }

  #[test]
  fn unusable_output_is_malformed() {
    assert!(matches!(parse_candidates("not json"), Err(GeneratorError::Malformed(_))));
    assert!(matches!(parse_candidates(r#"{"items":{}}"#), Err(GeneratorError::Malformed(_))));
    assert!(matches!(parse_candidates("42"), Err(GeneratorError::Malformed(_))));
  }

  #[test]
  fn openai_error_message_is_extracted() {
    let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Invalid API key"));
    assert_eq!(extract_openai_error("<html>"), None);
  }
}
