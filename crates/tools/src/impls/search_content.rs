//! SearchCourseContent Tool
//!
//! Semantic search over course material with optional course and lesson
//! filters. Course names are resolved fuzzily by the knowledge store, so the
//! model can pass partial titles.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use course_assistant_core::{CoreError, CoreResult, KnowledgeStore, SearchRequest};
use course_assistant_llm::ParameterSchema;

use crate::trait_def::{Source, Tool, ToolOutput};

/// Registered name of the content search tool
pub const SEARCH_COURSE_CONTENT: &str = "search_course_content";

/// Tool for searching course content through a `KnowledgeStore`.
pub struct SearchCourseContentTool {
    store: Arc<dyn KnowledgeStore>,
}

impl SearchCourseContentTool {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self { store }
    }

    async fn lesson_link(&self, course_title: &str, lesson_number: Option<u32>) -> Option<String> {
        match self.store.get_lesson_link(course_title, lesson_number).await {
            Ok(link) => link,
            Err(e) => {
                // A missing link should not cost the model its search results.
                warn!(course = %course_title, error = %e, "lesson link lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl Tool for SearchCourseContentTool {
    fn name(&self) -> &str {
        SEARCH_COURSE_CONTENT
    }

    fn description(&self) -> &str {
        "Search course materials with smart course name matching and lesson filtering"
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();

        properties.insert(
            "query".to_string(),
            ParameterSchema::string(Some("What to search for in the course content")),
        );
        properties.insert(
            "course_name".to_string(),
            ParameterSchema::string(Some(
                "Course title (partial matches work, e.g. 'MCP', 'Introduction')",
            )),
        );
        properties.insert(
            "lesson_number".to_string(),
            ParameterSchema::integer(Some("Specific lesson number to search within (e.g. 1, 2, 3)")),
        );

        ParameterSchema::object(None, properties, vec!["query".to_string()])
    }

    async fn execute(&self, args: Value) -> CoreResult<ToolOutput> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CoreError::validation("missing required parameter: query"))?;
        let course_name = args.get("course_name").and_then(|v| v.as_str());
        let lesson_number = parse_lesson_number(&args)?;

        let mut request = SearchRequest::new(query);
        if let Some(name) = course_name {
            request = request.with_course(name);
        }
        if let Some(n) = lesson_number {
            request = request.with_lesson(n);
        }

        let results = self.store.search(request).await?;
        if let Some(failure) = &results.error {
            return Ok(ToolOutput::text(failure.to_string()));
        }

        if results.is_empty() {
            let mut message = String::from("No relevant content found");
            if let Some(name) = course_name {
                message.push_str(&format!(" in course '{}'", name));
            }
            if let Some(n) = lesson_number {
                message.push_str(&format!(" in lesson {}", n));
            }
            return Ok(ToolOutput::text(message));
        }

        let mut blocks = Vec::with_capacity(results.len());
        let mut sources = Vec::with_capacity(results.len());
        for (document, meta) in results.hits() {
            let title = meta.course_title.as_deref().unwrap_or("unknown");
            let (header, label) = match meta.lesson_number {
                Some(n) => (
                    format!("[{} – Lesson {}]", title, n),
                    format!("{} - Lesson {}", title, n),
                ),
                None => (format!("[{}]", title), title.to_string()),
            };
            let url = match meta.course_title.as_deref() {
                Some(course) => self.lesson_link(course, meta.lesson_number).await,
                None => None,
            };

            blocks.push(format!("{}\n{}", header, document));
            sources.push(Source::new(label, url));
        }

        debug!(hits = blocks.len(), "course content search");
        Ok(ToolOutput::with_sources(blocks.join("\n\n"), sources))
    }
}

fn parse_lesson_number(args: &Value) -> CoreResult<Option<u32>> {
    match args.get("lesson_number") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                CoreError::validation(format!(
                    "lesson_number must be a non-negative integer, got {}",
                    v
                ))
            }),
    }
}
