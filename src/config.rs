//! Loading agent configuration (generator prompts + suggestion settings) from TOML.
//!
//! See `AgentConfig`, `Prompts` and `SuggestionSettings` for the expected schema.
//! Every section is optional; missing keys fall back to the defaults below.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub suggestions: SuggestionSettings,
}

/// Prompts used by the exercise generator.
///
/// Templates understand `{limit}`, `{min}`, `{max}`, `{kinds}`,
/// `{native_locale}` and `{target_locale}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub suggestion_system: String,
  pub suggestion_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      suggestion_system: "You are a language practice item generator. Output STRICT JSON only. Language for prompts and content is {target_locale}; the learner's native language is {native_locale}.".into(),
      suggestion_user_template: "Return a JSON object {\"items\": [...]} with exactly {limit} items. Types must be one of {kinds}. difficultyRating must be in [{min}, {max}]. Schema per item: { id: string, type, prompt: string, data: type-specific, difficultyRating: number, estimatedTime: number, keywords: string[] }. For mcq.data use { question: string, options: string[], correctIndex: number }. For true_false.data use { statement: string, correct: boolean }. For match.data use { left: string[], right: string[], pairs: Array<{ i: number, v: number }> } mapping indices. For anagram.data use { letters: string[], target: string }.".into(),
    }
  }
}

/// Knobs for the suggestions endpoint.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SuggestionSettings {
  pub default_limit: usize,
  pub max_limit: usize,
  pub default_native_locale: String,
  pub default_target_locale: String,
}

impl Default for SuggestionSettings {
  fn default() -> Self {
    Self {
      default_limit: 5,
      max_limit: 10,
      default_native_locale: "vi".into(),
      default_target_locale: "en".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_agent_config(&s) {
      Ok(cfg) => {
        info!(target: "practice_backend", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "practice_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "practice_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}
