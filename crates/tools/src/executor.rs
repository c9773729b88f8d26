//! Tool Execution Types
//!
//! What the dispatcher hands back for one tool invocation, and the closed
//! set of ways an invocation can fail.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use course_assistant_llm::MessageContent;

use crate::trait_def::Source;

/// Why a tool invocation failed.
///
/// None of these ever stop a query: the dispatcher renders them as text
/// for the model.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolError {
    /// No tool registered under this name
    #[error("Tool '{name}' not found")]
    NotFound { name: String },

    /// Arguments did not match the tool's declared schema
    #[error("Error executing tool '{tool}': invalid arguments: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The tool itself failed
    #[error("Error executing tool '{tool}': {message}")]
    Execution { tool: String, message: String },
}

impl ToolError {
    /// Create a not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

impl From<ToolError> for String {
    fn from(err: ToolError) -> String {
        err.to_string()
    }
}

/// Outcome of dispatching one tool-use block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecution {
    /// Id of the tool-use block this answers
    pub tool_use_id: String,
    /// Tool name as requested by the model
    pub name: String,
    /// Text for the tool result block
    pub content: String,
    /// Whether the invocation failed
    pub is_error: bool,
    /// Sources produced by a successful invocation
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Typed failure, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolExecution {
    /// Successful execution
    pub fn ok(
        tool_use_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        sources: Vec<Source>,
    ) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            name: name.into(),
            content: content.into(),
            is_error: false,
            sources,
            error: None,
        }
    }

    /// Failed execution; the error's message becomes the content.
    ///
    /// An unknown tool name reaches the model as plain result text, so only
    /// invalid arguments and execution failures are flagged `is_error`.
    pub fn failed(
        tool_use_id: impl Into<String>,
        name: impl Into<String>,
        error: ToolError,
    ) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            name: name.into(),
            content: error.to_string(),
            is_error: !matches!(error, ToolError::NotFound { .. }),
            sources: Vec::new(),
            error: Some(error),
        }
    }

    /// Convert to a tool result block for the next model call
    pub fn to_content(&self) -> MessageContent {
        MessageContent::tool_result(&self.tool_use_id, &self.content, self.is_error)
    }
}
