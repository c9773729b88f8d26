//! Tool Dispatcher
//!
//! Registry of available tools plus the error containment around executing
//! them. Whatever a tool does, the dispatcher hands back text for the model;
//! nothing a tool does can fail the query that invoked it.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use course_assistant_llm::ToolDefinition;

use crate::executor::{ToolError, ToolExecution};
use crate::schema::validate_arguments;
use crate::trait_def::{Source, Tool, ToolOutput};

/// Name-keyed tool registry with a "sources of the last execution" slot.
///
/// The slot is shared by everyone holding this dispatcher. Callers running
/// concurrent queries should rely on `ToolExecution::sources` instead.
pub struct ToolDispatcher {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Insertion order for deterministic iteration
    order: Vec<String>,
    last_sources: Mutex<Vec<Source>>,
}

impl ToolDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            last_sources: Mutex::new(Vec::new()),
        }
    }

    /// Register a tool under its own name.
    ///
    /// A tool with the same name is replaced; it keeps its original
    /// position in `tool_definitions()`.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            debug!(tool = %name, "replacing registered tool");
        } else {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Builder-style `register`
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Whether a tool is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All tool definitions, in registration order.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Execute a tool and return only the text for the model.
    ///
    /// Never fails: unknown names and failures come back as messages.
    pub async fn execute(&self, name: &str, args: Value) -> String {
        match self.run(name, args).await {
            Ok(output) => output.content,
            Err(err) => err.to_string(),
        }
    }

    /// Execute the tool requested by one tool-use block.
    pub async fn dispatch(&self, tool_use_id: &str, name: &str, args: Value) -> ToolExecution {
        match self.run(name, args).await {
            Ok(output) => ToolExecution::ok(tool_use_id, name, output.content, output.sources),
            Err(err) => ToolExecution::failed(tool_use_id, name, err),
        }
    }

    /// Sources recorded by the most recent execution of a registered tool.
    pub fn last_sources(&self) -> Vec<Source> {
        self.sources_slot().clone()
    }

    /// Clear the sources slot.
    pub fn reset_sources(&self) {
        self.sources_slot().clear();
    }

    async fn run(&self, name: &str, args: Value) -> Result<ToolOutput, ToolError> {
        let Some(tool) = self.get(name) else {
            warn!(tool = %name, "model requested unknown tool");
            return Err(ToolError::not_found(name));
        };

        let result = match validate_arguments(&tool.parameters_schema(), &args) {
            Ok(()) => tool
                .execute(args)
                .await
                .map_err(|e| ToolError::execution(name, e.to_string())),
            Err(message) => Err(ToolError::invalid_arguments(name, message)),
        };

        match &result {
            Ok(output) => {
                debug!(tool = %name, sources = output.sources.len(), "tool executed");
                *self.sources_slot() = output.sources.clone();
            }
            Err(err) => {
                warn!(tool = %name, error = %err, "tool execution failed");
                self.sources_slot().clear();
            }
        }
        result
    }

    // A poisoned slot only means another task panicked mid-assignment of a
    // plain Vec; the data is still usable.
    fn sources_slot(&self) -> MutexGuard<'_, Vec<Source>> {
        self.last_sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
