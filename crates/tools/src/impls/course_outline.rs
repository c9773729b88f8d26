//! GetCourseOutline Tool
//!
//! Returns a course's title, link and full lesson list.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use course_assistant_core::{CoreError, CoreResult, CourseOutline, KnowledgeStore};
use course_assistant_llm::ParameterSchema;

use crate::trait_def::{Source, Tool, ToolOutput};

/// Registered name of the outline tool
pub const GET_COURSE_OUTLINE: &str = "get_course_outline";

/// Tool for looking up a course outline through a `KnowledgeStore`.
pub struct CourseOutlineTool {
    store: Arc<dyn KnowledgeStore>,
}

impl CourseOutlineTool {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn name(&self) -> &str {
        GET_COURSE_OUTLINE
    }

    fn description(&self) -> &str {
        "Get the complete outline of a course including title, link, and all lessons"
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "course_title".to_string(),
            ParameterSchema::string(Some(
                "Course title or partial title (e.g. 'MCP', 'Introduction')",
            )),
        );
        ParameterSchema::object(None, properties, vec!["course_title".to_string()])
    }

    async fn execute(&self, args: Value) -> CoreResult<ToolOutput> {
        let input = args
            .get("course_title")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CoreError::validation("missing required parameter: course_title"))?;

        let outline = match self.store.resolve_course_name(input).await? {
            Some(title) => self.store.get_course_outline(&title).await?,
            None => None,
        };

        match outline {
            Some(outline) => {
                let source = Source::new(outline.title.clone(), outline.course_link.clone());
                Ok(ToolOutput::with_sources(format_outline(&outline), vec![source]))
            }
            None => Ok(ToolOutput::text(format!(
                "No course found matching '{}'",
                input
            ))),
        }
    }
}

fn format_outline(outline: &CourseOutline) -> String {
    let mut lines = vec![format!("Course: {}", outline.title)];
    if let Some(link) = &outline.course_link {
        lines.push(format!("Link: {}", link));
    }
    lines.push(String::new());
    lines.push(format!("Lessons ({} total):", outline.lessons.len()));
    for lesson in &outline.lessons {
        lines.push(format!("{}. {}", lesson.number, lesson.title));
    }
    lines.join("\n")
}
