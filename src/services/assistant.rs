//! Course Assistant
//!
//! Answers questions about course materials. Owns the course tools and an
//! orchestrator, and returns each answer with the sources it drew on.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use course_assistant_core::KnowledgeStore;
use course_assistant_llm::{AnthropicProvider, LlmProvider, ToolDefinition};
use course_assistant_tools::{course_tools, Source, ToolDispatcher};

use crate::models::settings::AppConfig;
use crate::services::orchestrator::prompts::course_query_prompt;
use crate::services::orchestrator::{
    GenerateRequest, GenerationStatus, Orchestrator, OrchestratorConfig,
};
use crate::utils::error::{AppError, AppResult};

/// Answer to one course question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    /// Provenance of the retrieved content the answer is based on
    pub sources: Vec<Source>,
}

/// Question answering over a course catalog
pub struct CourseAssistant {
    orchestrator: Orchestrator,
    dispatcher: ToolDispatcher,
}

impl CourseAssistant {
    /// Build an assistant with the course tools registered against `store`.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn KnowledgeStore>,
        config: OrchestratorConfig,
    ) -> AppResult<Self> {
        Self::with_dispatcher(provider, course_tools(store), config)
    }

    /// Build an assistant with a caller-supplied tool set.
    pub fn with_dispatcher(
        provider: Arc<dyn LlmProvider>,
        dispatcher: ToolDispatcher,
        config: OrchestratorConfig,
    ) -> AppResult<Self> {
        let orchestrator = Orchestrator::new(provider, config)?;
        Ok(Self {
            orchestrator,
            dispatcher,
        })
    }

    /// Build an assistant talking to the Anthropic API.
    pub fn from_config(config: &AppConfig, store: Arc<dyn KnowledgeStore>) -> AppResult<Self> {
        config.validate().map_err(AppError::validation)?;
        let provider = AnthropicProvider::new(config.provider_config())?;
        tracing::info!(
            "Course assistant using {} model {}",
            provider.name(),
            provider.model()
        );
        Self::new(Arc::new(provider), store, config.orchestrator_config())
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Definitions of the tools offered to the model
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.dispatcher.tool_definitions()
    }

    /// Answer a question, optionally in the context of earlier conversation.
    ///
    /// Sources left over from a previous query are cleared first, so the
    /// returned sources only ever describe this query.
    pub async fn answer_query(&self, query: &str, history: Option<&str>) -> AppResult<QueryAnswer> {
        self.dispatcher.reset_sources();

        let prompt = course_query_prompt(query);
        let request = GenerateRequest::new(&prompt)
            .with_history(history)
            .with_tools(&self.dispatcher);
        let generation = self.orchestrator.generate(request).await?;

        match &generation.status {
            GenerationStatus::Degraded { error } => {
                tracing::warn!("Query answered in degraded mode: {}", error);
            }
            status => {
                tracing::info!(
                    "Query answered ({:?}): {} round(s), {} source(s), {} tokens",
                    status,
                    generation.rounds,
                    generation.sources.len(),
                    generation.usage.total_tokens()
                );
            }
        }

        Ok(QueryAnswer {
            answer: generation.text,
            sources: generation.sources,
        })
    }
}
