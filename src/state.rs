//! Application state: suggestion settings and the suggestion pipeline with its
//! optional generator.
//!
//! Nothing here is mutable after startup; ratings and keywords belong to the
//! caller and arrive with each request.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{load_agent_config_from_env, SuggestionSettings};
use crate::generator::{ExerciseGenerator, OpenAiGenerator};
use crate::suggestions::SuggestionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: SuggestionPipeline,
    pub settings: SuggestionSettings,
}

impl AppState {
    /// Build state from env: load config, then init the generator if a key is present.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_agent_config_from_env().unwrap_or_default();

        let generator = OpenAiGenerator::from_env(cfg.prompts.clone());
        let generator: Option<Arc<dyn ExerciseGenerator>> = match generator {
            Some(g) => {
                info!(target: "practice_backend", base_url = %g.base_url, model = %g.model, "Exercise generator enabled.");
                Some(Arc::new(g))
            }
            None => {
                warn!(target: "practice_backend", "Exercise generator disabled (no OPENAI_API_KEY). Suggestions will report unavailable.");
                None
            }
        };

        Self::with_generator(generator, cfg.suggestions)
    }

    pub fn with_generator(generator: Option<Arc<dyn ExerciseGenerator>>, settings: SuggestionSettings) -> Self {
        Self {
            pipeline: SuggestionPipeline::new(generator),
            settings,
        }
    }
}
