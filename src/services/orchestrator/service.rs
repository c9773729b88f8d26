//! Orchestrator Service
//!
//! Drives one query through the model with a hard cap on tool rounds.
//!
//! Each round is one model call that asked for tools, followed by executing
//! every requested tool in emitted order. Once the budget is spent the model
//! gets one last call with no tools offered, so it has to answer with what
//! it already has. A query therefore makes at most `max_rounds + 1` model
//! calls.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use course_assistant_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ToolChoice,
    ToolDefinition, UsageStats,
};
use course_assistant_tools::{Source, ToolDispatcher, ToolError};

use super::prompts::{course_system_prompt, with_history};

/// What a query returns when the model service fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelErrorPolicy {
    /// Return the failure as the answer text, marked `Degraded`
    #[default]
    Answer,
    /// Return `Err(OrchestratorError)`
    Fail,
}

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Tool rounds allowed before the forced final call
    pub max_rounds: u32,
    /// Deadline for each model call
    pub request_timeout: Duration,
    pub on_model_error: ModelErrorPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            request_timeout: Duration::from_secs(60),
            on_model_error: ModelErrorPolicy::Answer,
        }
    }
}

/// Errors that end a query without an answer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    /// Orchestrator constructed with unusable settings
    #[error("Invalid orchestrator configuration: {0}")]
    InvalidConfig(String),

    /// A model call inside the tool loop failed
    #[error("Error communicating with AI: {0}")]
    Model(LlmError),

    /// The forced final call failed
    #[error("Error getting final response: {0}")]
    FinalResponse(LlmError),
}

impl OrchestratorError {
    /// The underlying model error, if any
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            OrchestratorError::Model(e) | OrchestratorError::FinalResponse(e) => Some(e),
            OrchestratorError::InvalidConfig(_) => None,
        }
    }
}

/// How a query ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationStatus {
    /// The model answered on its own
    Completed,
    /// The round budget ran out and the answer came from the forced final call
    RoundBudgetExhausted,
    /// A model call failed and the answer text is the failure message
    Degraded { error: String },
}

/// Result of one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Final answer text (possibly empty)
    pub text: String,
    /// Sources of the last registered tool executed for this query
    pub sources: Vec<Source>,
    /// Completed tool rounds
    pub rounds: u32,
    /// Model calls made
    pub model_calls: u32,
    /// Token usage summed over all calls
    pub usage: UsageStats,
    pub status: GenerationStatus,
}

/// Input to `Orchestrator::generate`
#[derive(Clone, Copy)]
pub struct GenerateRequest<'a> {
    /// User query, sent as the first message verbatim
    pub query: &'a str,
    /// Prior conversation, folded into the system prompt
    pub history: Option<&'a str>,
    /// Tools the model may call
    pub tools: Option<&'a ToolDispatcher>,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            history: None,
            tools: None,
        }
    }

    pub fn with_history(mut self, history: Option<&'a str>) -> Self {
        self.history = history;
        self
    }

    pub fn with_tools(mut self, tools: &'a ToolDispatcher) -> Self {
        self.tools = Some(tools);
        self
    }
}

/// Per-query loop state
struct RoundState {
    messages: Vec<Message>,
    sources: Vec<Source>,
    rounds: u32,
    model_calls: u32,
    usage: UsageStats,
}

impl RoundState {
    fn new(query: &str) -> Self {
        Self {
            messages: vec![Message::user(query)],
            sources: Vec::new(),
            rounds: 0,
            model_calls: 0,
            usage: UsageStats::default(),
        }
    }

    fn record_usage(&mut self, response: &LlmResponse) {
        self.usage.input_tokens += response.usage.input_tokens;
        self.usage.output_tokens += response.usage.output_tokens;
    }

    fn finish(self, text: String, status: GenerationStatus) -> Generation {
        Generation {
            text,
            sources: self.sources,
            rounds: self.rounds,
            model_calls: self.model_calls,
            usage: self.usage,
            status,
        }
    }
}

/// Bounded tool-calling orchestrator
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: OrchestratorConfig,
    system_prompt: String,
}

impl Orchestrator {
    /// Create an orchestrator using the course assistant system prompt.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        config: OrchestratorConfig,
    ) -> Result<Self, OrchestratorError> {
        let system_prompt = course_system_prompt(config.max_rounds);
        Self::with_system_prompt(provider, config, system_prompt)
    }

    /// Create an orchestrator with a custom system prompt.
    pub fn with_system_prompt(
        provider: Arc<dyn LlmProvider>,
        config: OrchestratorConfig,
        system_prompt: impl Into<String>,
    ) -> Result<Self, OrchestratorError> {
        if config.max_rounds == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if config.request_timeout.is_zero() {
            return Err(OrchestratorError::InvalidConfig(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            provider,
            config,
            system_prompt: system_prompt.into(),
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Answer one query, calling tools for at most `max_rounds` rounds.
    pub async fn generate(
        &self,
        request: GenerateRequest<'_>,
    ) -> Result<Generation, OrchestratorError> {
        let system = with_history(&self.system_prompt, request.history);
        let mut state = RoundState::new(request.query);

        let Some(dispatcher) = request.tools.filter(|d| !d.is_empty()) else {
            return self.generate_without_tools(state, &system).await;
        };

        let definitions = dispatcher.tool_definitions();
        for round in 0..self.config.max_rounds {
            state.model_calls += 1;
            tracing::debug!(
                "[orchestrator] round {} model call: {} messages, {} tools",
                round,
                state.messages.len(),
                definitions.len()
            );

            let response = match self
                .call_model(&state.messages, &system, &definitions, ToolChoice::Auto)
                .await
            {
                Ok(response) => response,
                Err(e) => return self.model_failed(state, OrchestratorError::Model(e)),
            };
            state.record_usage(&response);

            if !response.wants_tools() {
                tracing::info!(
                    "[orchestrator] answered after {} round(s), {} model call(s)",
                    state.rounds,
                    state.model_calls
                );
                return Ok(state.finish(response.text(), GenerationStatus::Completed));
            }

            let mut results = Vec::new();
            for call in response.tool_calls() {
                let execution = dispatcher
                    .dispatch(call.id, call.name, call.arguments.clone())
                    .await;
                if !matches!(execution.error, Some(ToolError::NotFound { .. })) {
                    state.sources = execution.sources.clone();
                }
                results.push(execution.to_content());
            }

            state
                .messages
                .push(Message::assistant_blocks(response.content));
            state.messages.push(Message::tool_results(results));
            state.rounds += 1;
        }

        tracing::warn!(
            "[orchestrator] round budget ({}) exhausted, forcing final answer",
            self.config.max_rounds
        );
        state.model_calls += 1;
        match self
            .call_model(&state.messages, &system, &[], ToolChoice::None)
            .await
        {
            Ok(response) => {
                state.record_usage(&response);
                Ok(state.finish(response.text(), GenerationStatus::RoundBudgetExhausted))
            }
            Err(e) => self.model_failed(state, OrchestratorError::FinalResponse(e)),
        }
    }

    /// Answer one query and return only the text.
    pub async fn generate_text(
        &self,
        request: GenerateRequest<'_>,
    ) -> Result<String, OrchestratorError> {
        Ok(self.generate(request).await?.text)
    }

    async fn generate_without_tools(
        &self,
        mut state: RoundState,
        system: &str,
    ) -> Result<Generation, OrchestratorError> {
        state.model_calls += 1;
        match self
            .call_model(&state.messages, system, &[], ToolChoice::None)
            .await
        {
            Ok(response) => {
                state.record_usage(&response);
                Ok(state.finish(response.text(), GenerationStatus::Completed))
            }
            Err(e) => self.model_failed(state, OrchestratorError::Model(e)),
        }
    }

    async fn call_model(
        &self,
        messages: &[Message],
        system: &str,
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> LlmResult<LlmResponse> {
        let options = LlmRequestOptions {
            tool_choice,
            temperature_override: None,
        };
        let call = self.provider.send_message(
            messages.to_vec(),
            Some(system.to_string()),
            tools.to_vec(),
            options,
        );
        match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                seconds: self.config.request_timeout.as_secs(),
            }),
        }
    }

    fn model_failed(
        &self,
        state: RoundState,
        error: OrchestratorError,
    ) -> Result<Generation, OrchestratorError> {
        tracing::warn!("[orchestrator] {}", error);
        match self.config.on_model_error {
            ModelErrorPolicy::Fail => Err(error),
            ModelErrorPolicy::Answer => {
                let detail = error
                    .llm_error()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                Ok(state.finish(
                    error.to_string(),
                    GenerationStatus::Degraded { error: detail },
                ))
            }
        }
    }
}
