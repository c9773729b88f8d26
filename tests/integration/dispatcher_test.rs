//! Dispatcher Integration Tests
//!
//! The course tools registered in a dispatcher over the sample catalog.

use serde_json::json;
use std::sync::Arc;

use course_assistant_llm::MessageContent;

use course_assistant_tools::{
    course_tools, Source, ToolError, GET_COURSE_OUTLINE, SEARCH_COURSE_CONTENT,
};

use super::mocks::{sample_store, FlakyStore, MCP_COURSE};

#[test]
fn test_course_tool_definitions() {
    let dispatcher = course_tools(Arc::new(sample_store()));
    let definitions = dispatcher.tool_definitions();

    let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec![SEARCH_COURSE_CONTENT, GET_COURSE_OUTLINE]);

    for definition in &definitions {
        assert!(!definition.description.is_empty());
        assert_eq!(definition.input_schema.schema_type, "object");
    }
    assert_eq!(
        definitions[0].input_schema.required,
        Some(vec!["query".to_string()])
    );
    assert_eq!(
        definitions[1].input_schema.required,
        Some(vec!["course_title".to_string()])
    );
}

#[tokio::test]
async fn test_search_formats_blocks_in_store_order() {
    let dispatcher = course_tools(Arc::new(sample_store()));

    let text = dispatcher
        .execute(SEARCH_COURSE_CONTENT, json!({"query": "MCP servers"}))
        .await;

    assert_eq!(
        text,
        format!(
            "[{t} – Lesson 2]\nWhy we need MCP servers\n\n[{t} – Lesson 1]\nMCP introduction and basic concepts",
            t = MCP_COURSE
        )
    );
}

#[tokio::test]
async fn test_empty_search_message() {
    let dispatcher = course_tools(Arc::new(sample_store()));

    let text = dispatcher
        .execute(SEARCH_COURSE_CONTENT, json!({"query": "quantum chromodynamics"}))
        .await;
    assert_eq!(text, "No relevant content found");

    let text = dispatcher
        .execute(
            SEARCH_COURSE_CONTENT,
            json!({"query": "quantum", "course_name": "MCP", "lesson_number": 2}),
        )
        .await;
    assert_eq!(text, "No relevant content found in course 'MCP' in lesson 2");
    assert!(dispatcher.last_sources().is_empty());
}

#[tokio::test]
async fn test_unknown_course_filter_is_distinct_from_empty() {
    let dispatcher = course_tools(Arc::new(sample_store()));

    let text = dispatcher
        .execute(
            SEARCH_COURSE_CONTENT,
            json!({"query": "anything", "course_name": "Cooking"}),
        )
        .await;
    assert_eq!(text, "No course found matching 'Cooking'");
}

#[tokio::test]
async fn test_outline_for_fuzzy_title() {
    let dispatcher = course_tools(Arc::new(sample_store()));

    let text = dispatcher
        .execute(GET_COURSE_OUTLINE, json!({"course_title": "rich-context"}))
        .await;
    assert_eq!(
        text,
        format!(
            "Course: {}\nLink: https://example.com/mcp\n\nLessons (2 total):\n1. Introduction\n2. Why MCP",
            MCP_COURSE
        )
    );
    assert_eq!(
        dispatcher.last_sources(),
        vec![Source::new(MCP_COURSE, Some("https://example.com/mcp".to_string()))]
    );

    let text = dispatcher
        .execute(GET_COURSE_OUTLINE, json!({"course_title": "Cooking"}))
        .await;
    assert_eq!(text, "No course found matching 'Cooking'");
}

#[tokio::test]
async fn test_unknown_tool_keeps_sources() {
    let dispatcher = course_tools(Arc::new(sample_store()));
    dispatcher
        .execute(SEARCH_COURSE_CONTENT, json!({"query": "MCP servers"}))
        .await;
    assert_eq!(dispatcher.last_sources().len(), 2);

    let execution = dispatcher
        .dispatch("toolu_9", "search_web", json!({"query": "MCP"}))
        .await;
    assert!(execution.content.to_lowercase().contains("not found"));
    assert!(!execution.is_error);
    assert!(matches!(execution.error, Some(ToolError::NotFound { .. })));
    assert_eq!(
        execution.to_content(),
        MessageContent::ToolResult {
            tool_use_id: "toolu_9".to_string(),
            content: "Tool 'search_web' not found".to_string(),
            is_error: None,
        }
    );
    assert_eq!(dispatcher.last_sources().len(), 2);
}

#[tokio::test]
async fn test_store_failure_is_contained() {
    let dispatcher = course_tools(Arc::new(FlakyStore::new(sample_store(), 1)));

    let execution = dispatcher
        .dispatch("toolu_1", SEARCH_COURSE_CONTENT, json!({"query": "MCP"}))
        .await;
    assert!(execution.is_error);
    assert!(matches!(execution.error, Some(ToolError::Execution { .. })));
    assert!(execution.sources.is_empty());

    // The store has recovered; the same call now succeeds.
    let execution = dispatcher
        .dispatch("toolu_2", SEARCH_COURSE_CONTENT, json!({"query": "MCP"}))
        .await;
    assert!(!execution.is_error);
    assert!(!execution.sources.is_empty());
}

#[tokio::test]
async fn test_reset_sources() {
    let dispatcher = course_tools(Arc::new(sample_store()));
    dispatcher
        .execute(GET_COURSE_OUTLINE, json!({"course_title": "Retrieval"}))
        .await;
    assert!(!dispatcher.last_sources().is_empty());

    dispatcher.reset_sources();
    assert!(dispatcher.last_sources().is_empty());
}
