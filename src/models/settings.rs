//! Settings Models
//!
//! Application configuration stored in config.json.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use course_assistant_core::DEFAULT_MAX_RESULTS;
use course_assistant_llm::ProviderConfig;

use crate::services::orchestrator::{ModelErrorPolicy, OrchestratorConfig};

/// Environment variable overriding `api_key`
pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Environment variable overriding `model`
pub const ENV_MODEL: &str = "ANTHROPIC_MODEL";
/// Environment variable overriding `max_tool_rounds`
pub const ENV_MAX_TOOL_ROUNDS: &str = "MAX_TOOL_ROUNDS";

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tool-calling rounds allowed per query before a forced final answer
    pub max_tool_rounds: u32,
    /// Anthropic model identifier
    pub model: String,
    /// Sampling temperature (0.0 - 1.0)
    pub temperature: f32,
    /// Maximum tokens per model response
    pub max_tokens: u32,
    /// Search hits returned per content search
    pub max_results: usize,
    /// Deadline for a single model call, in seconds
    pub request_timeout_secs: u64,
    /// What a query returns when the model service fails
    pub on_model_error: ModelErrorPolicy,
    /// Messages endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// API key; usually supplied through the environment instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 2,
            model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.0,
            max_tokens: 800,
            max_results: DEFAULT_MAX_RESULTS,
            request_timeout_secs: 60,
            on_model_error: ModelErrorPolicy::default(),
            base_url: None,
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tool_rounds == 0 {
            return Err("max_tool_rounds must be at least 1".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1".to_string());
        }
        if self.max_results == 0 {
            return Err("max_results must be at least 1".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored. An unparseable round count is an error
    /// rather than silently keeping the file value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = model;
        }
        if let Some(rounds) = get(ENV_MAX_TOOL_ROUNDS) {
            self.max_tool_rounds = rounds.trim().parse().map_err(|_| {
                format!("{} must be a positive integer, got '{}'", ENV_MAX_TOOL_ROUNDS, rounds)
            })?;
        }
        Ok(())
    }

    /// Provider settings derived from this configuration
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            ..Default::default()
        }
    }

    /// Orchestrator settings derived from this configuration
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_rounds: self.max_tool_rounds,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            on_model_error: self.on_model_error,
        }
    }
}
