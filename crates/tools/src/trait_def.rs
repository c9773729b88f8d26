//! Tool Trait
//!
//! Defines the `Tool` interface every retrieval tool implements, the
//! `ToolOutput` it returns, and `FunctionTool` for closure-based tools.
//!
//! Sources travel inside `ToolOutput` rather than living on the tool, so a
//! tool instance holds no per-query state and can be shared freely.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

use course_assistant_core::CoreResult;
use course_assistant_llm::{ParameterSchema, ToolDefinition};

/// Provenance for one unit of retrieved content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display label, e.g. "Course Title - Lesson 2"
    pub text: String,
    /// Link to the lesson or course, when the store knows one
    pub url: Option<String>,
}

impl Source {
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url,
        }
    }
}

/// Result of a successful tool execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Text handed back to the model
    pub content: String,
    /// Where the content came from, in result order
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl ToolOutput {
    /// Output without provenance
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sources: Vec::new(),
        }
    }

    /// Output with provenance
    pub fn with_sources(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            content: content.into(),
            sources,
        }
    }
}

/// Unified tool interface.
///
/// Each tool provides its identity (name, description, parameters schema)
/// and execution logic. Tools are registered in a `ToolDispatcher`, which
/// validates arguments against `parameters_schema()` before `execute` runs.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of this tool (e.g., "search_course_content")
    fn name(&self) -> &str;

    /// Human-readable description of what this tool does
    fn description(&self) -> &str;

    /// JSON schema describing the tool's input parameters
    fn parameters_schema(&self) -> ParameterSchema;

    /// Execute the tool with already-validated arguments.
    async fn execute(&self, args: Value) -> CoreResult<ToolOutput>;

    /// Definition sent to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}

// ── FunctionTool ─────────────────────────────────────────────────────

/// Future returned by a `FunctionTool` handler.
pub type ToolFuture = Pin<Box<dyn Future<Output = CoreResult<ToolOutput>> + Send>>;

/// Type alias for the async handler function used by `FunctionTool`.
pub type FunctionToolHandler = Box<dyn Fn(Value) -> ToolFuture + Send + Sync>;

/// A tool created from an async closure.
///
/// # Example
///
/// ```ignore
/// let tool = FunctionTool::new(
///     "echo",
///     "Echoes the input",
///     ParameterSchema::object(None, HashMap::new(), vec![]),
///     |args| Box::pin(async move {
///         let msg = args.get("message").and_then(|v| v.as_str()).unwrap_or("(empty)");
///         Ok(ToolOutput::text(msg))
///     }),
/// );
/// ```
pub struct FunctionTool {
    tool_name: String,
    tool_description: String,
    schema: ParameterSchema,
    handler: FunctionToolHandler,
}

impl FunctionTool {
    /// Create a new FunctionTool from an async closure.
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ParameterSchema,
        handler: F,
    ) -> Self
    where
        F: Fn(Value) -> ToolFuture + Send + Sync + 'static,
    {
        Self {
            tool_name: name.into(),
            tool_description: description.into(),
            schema,
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.tool_name
    }

    fn description(&self) -> &str {
        &self.tool_description
    }

    fn parameters_schema(&self) -> ParameterSchema {
        self.schema.clone()
    }

    async fn execute(&self, args: Value) -> CoreResult<ToolOutput> {
        (self.handler)(args).await
    }
}
