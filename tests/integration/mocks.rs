//! Test doubles shared by the integration tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use course_assistant_core::{
    CoreError, CoreResult, CourseChunk, CourseOutline, InMemoryKnowledgeStore, KnowledgeStore,
    LessonEntry, SearchRequest, SearchResults,
};
use course_assistant_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, MessageContent,
    ProviderConfig, StopReason, ToolChoice, ToolDefinition, UsageStats,
};

pub const MCP_COURSE: &str = "MCP: Build Rich-Context AI Apps";
pub const RAG_COURSE: &str = "Retrieval Basics";

/// One recorded model call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: ToolChoice,
}

/// Provider replaying a fixed script and recording every request
pub struct ScriptedProvider {
    config: ProviderConfig,
    script: Mutex<VecDeque<LlmResult<LlmResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<LlmResult<LlmResponse>>) -> Self {
        Self {
            config: ProviderConfig::default(),
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages,
            system,
            tools,
            tool_choice: request_options.tool_choice,
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Other {
                    message: "script exhausted".to_string(),
                })
            })
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

pub fn text_response(text: &str) -> LlmResult<LlmResponse> {
    Ok(LlmResponse {
        content: vec![MessageContent::Text {
            text: text.to_string(),
        }],
        stop_reason: StopReason::EndTurn,
        usage: UsageStats {
            input_tokens: 100,
            output_tokens: 20,
        },
        model: "scripted-model".to_string(),
    })
}

/// A `tool_use` response carrying one call, with optional preamble text.
pub fn tool_use_response(id: &str, name: &str, input: Value) -> LlmResult<LlmResponse> {
    tool_uses_response(None, vec![(id, name, input)])
}

pub fn tool_uses_response(
    preamble: Option<&str>,
    calls: Vec<(&str, &str, Value)>,
) -> LlmResult<LlmResponse> {
    let mut content = Vec::new();
    if let Some(text) = preamble {
        content.push(MessageContent::Text {
            text: text.to_string(),
        });
    }
    for (id, name, input) in calls {
        content.push(MessageContent::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        });
    }
    Ok(LlmResponse {
        content,
        stop_reason: StopReason::ToolUse,
        usage: UsageStats {
            input_tokens: 100,
            output_tokens: 20,
        },
        model: "scripted-model".to_string(),
    })
}

/// Two-course catalog with lesson links
pub fn sample_store() -> InMemoryKnowledgeStore {
    let mut store = InMemoryKnowledgeStore::new();
    store.add_course(CourseOutline {
        title: MCP_COURSE.to_string(),
        course_link: Some("https://example.com/mcp".to_string()),
        lessons: vec![
            LessonEntry {
                number: 1,
                title: "Introduction".to_string(),
                link: Some("https://example.com/mcp/1".to_string()),
            },
            LessonEntry {
                number: 2,
                title: "Why MCP".to_string(),
                link: Some("https://example.com/mcp/2".to_string()),
            },
        ],
    });
    store.add_course(CourseOutline {
        title: RAG_COURSE.to_string(),
        course_link: Some("https://example.com/rag".to_string()),
        lessons: vec![LessonEntry {
            number: 1,
            title: "Embeddings".to_string(),
            link: Some("https://example.com/rag/1".to_string()),
        }],
    });
    store.add_chunk(CourseChunk {
        content: "MCP introduction and basic concepts".to_string(),
        course_title: MCP_COURSE.to_string(),
        lesson_number: Some(1),
        chunk_index: 0,
    });
    store.add_chunk(CourseChunk {
        content: "Why we need MCP servers".to_string(),
        course_title: MCP_COURSE.to_string(),
        lesson_number: Some(2),
        chunk_index: 1,
    });
    store.add_chunk(CourseChunk {
        content: "Embeddings and vector search basics".to_string(),
        course_title: RAG_COURSE.to_string(),
        lesson_number: Some(1),
        chunk_index: 2,
    });
    store
}

/// Store whose first `failures` searches error out
pub struct FlakyStore {
    inner: InMemoryKnowledgeStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: InMemoryKnowledgeStore, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl KnowledgeStore for FlakyStore {
    async fn search(&self, request: SearchRequest) -> CoreResult<SearchResults> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CoreError::store("vector index unavailable"));
        }
        self.inner.search(request).await
    }

    async fn resolve_course_name(&self, partial: &str) -> CoreResult<Option<String>> {
        self.inner.resolve_course_name(partial).await
    }

    async fn get_lesson_link(
        &self,
        course_title: &str,
        lesson_number: Option<u32>,
    ) -> CoreResult<Option<String>> {
        self.inner.get_lesson_link(course_title, lesson_number).await
    }

    async fn get_course_outline(&self, course_title: &str) -> CoreResult<Option<CourseOutline>> {
        self.inner.get_course_outline(course_title).await
    }
}

/// Text of every tool result block in a message list, in order
pub fn tool_results(messages: &[Message]) -> Vec<(String, bool)> {
    messages
        .iter()
        .flat_map(|m| m.content.iter())
        .filter_map(|block| match block {
            MessageContent::ToolResult {
                content, is_error, ..
            } => Some((content.clone(), is_error.unwrap_or(false))),
            _ => None,
        })
        .collect()
}
