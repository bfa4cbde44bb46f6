//! Recipe generation through an external text-generation backend.

pub mod backend;
mod prompt;
mod schema;

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub use backend::{CommandBackend, GenerationBackend, MistralBackend};
pub use prompt::{build_meal_plan_prompt, build_prompt, GenerationRequest, Preferences, SkillLevel};
pub use schema::{parse_meal_plan, parse_recipe, DayPlan, GeneratedRecipe, Ingredient, MealPlan, NutritionalInfo};

use crate::config::{GeneratorBackendConfig, GeneratorConfig};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("backend unavailable: {0}")]
    Backend(String),
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("backend timed out after {0:?}")]
    Timeout(Duration),
    #[error("backend returned an empty response")]
    Empty,
    #[error("response is not valid JSON: {0}")]
    Malformed(String),
    #[error("response does not match the recipe schema: {0}")]
    Schema(String),
}

impl GenerationError {
    /// Transport failures and timeouts may succeed on another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Backend(_) | GenerationError::Timeout(_))
    }

    /// Short client-facing description that leaks no backend details.
    pub fn category(&self) -> &'static str {
        match self {
            GenerationError::Backend(_) => "generation service unavailable",
            GenerationError::Rejected(_) => "generation service rejected the request",
            GenerationError::Timeout(_) => "generation service timed out",
            GenerationError::Empty => "generation service returned no recipe",
            GenerationError::Malformed(_) | GenerationError::Schema(_) => {
                "generation service returned an invalid recipe"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    /// Delay before retrying after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exp);
        Duration::from_secs_f64(secs).min(self.max_delay)
    }
}

/// Builds prompts, calls the backend with a timeout, and validates the reply.
pub struct RecipeGenerator {
    backend: Arc<dyn GenerationBackend>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RecipeGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            backend,
            timeout,
            retry,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> anyhow::Result<Self> {
        let backend: Arc<dyn GenerationBackend> = match &config.backend {
            GeneratorBackendConfig::Mistral {
                api_url,
                api_key,
                model,
            } => Arc::new(MistralBackend::new(
                api_url.clone(),
                api_key.clone(),
                model.clone(),
                config.temperature,
            )?),
            GeneratorBackendConfig::Command { program, args } => {
                Arc::new(CommandBackend::new(program.clone(), args.clone()))
            }
        };
        Ok(Self::new(
            backend,
            Duration::from_secs(config.timeout_secs),
            RetryPolicy::with_attempts(config.max_attempts),
        ))
    }

    #[instrument(skip(self, request), fields(ingredients = request.ingredients.len()))]
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedRecipe, GenerationError> {
        let recipe = self.run(&build_prompt(request), parse_recipe).await?;
        info!(name = %recipe.name, "recipe generated");
        Ok(recipe)
    }

    #[instrument(skip(self, request), fields(ingredients = request.ingredients.len()))]
    pub async fn generate_meal_plan(&self, request: &GenerationRequest) -> Result<MealPlan, GenerationError> {
        let plan = self.run(&build_meal_plan_prompt(request), parse_meal_plan).await?;
        info!(days = plan.days.len(), "meal plan generated");
        Ok(plan)
    }

    /// Calls the backend with a per-attempt timeout and parses the reply,
    /// retrying transport failures with backoff.
    async fn run<T>(
        &self,
        prompt: &str,
        parse: fn(&str) -> Result<T, GenerationError>,
    ) -> Result<T, GenerationError> {
        let mut attempt = 1;

        loop {
            let result = match tokio::time::timeout(self.timeout, self.backend.complete(prompt)).await {
                Ok(reply) => reply.and_then(|raw| parse(&raw)),
                Err(_) => Err(GenerationError::Timeout(self.timeout)),
            };

            match result {
                Ok(value) => {
                    debug!(attempt, "generation succeeded");
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(attempt, error = %err, ?delay, "generation attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(attempt, error = %err, "generation failed");
                    return Err(err);
                }
            }
        }
    }
}
