//! Orchestrator Integration Tests
//!
//! Drives the bounded round loop with a scripted model and the real course
//! tools over an in-memory catalog.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use course_assistant::{
    GenerateRequest, GenerationStatus, ModelErrorPolicy, Orchestrator, OrchestratorConfig,
    OrchestratorError,
};
use course_assistant_llm::{LlmError, MessageRole, ToolChoice};
use course_assistant_tools::{course_tools, Source, GET_COURSE_OUTLINE, SEARCH_COURSE_CONTENT};

use super::mocks::{
    sample_store, text_response, tool_results, tool_use_response, tool_uses_response, FlakyStore,
    ScriptedProvider, MCP_COURSE, RAG_COURSE,
};

fn config(max_rounds: u32) -> OrchestratorConfig {
    OrchestratorConfig {
        max_rounds,
        request_timeout: Duration::from_secs(5),
        on_model_error: ModelErrorPolicy::Answer,
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_plain_answer_without_tools() {
    let provider = Arc::new(ScriptedProvider::new(vec![text_response(
        "The capital is Paris.",
    )]));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("What is the capital of France?"))
        .await
        .unwrap();

    assert_eq!(generation.text, "The capital is Paris.");
    assert_eq!(provider.call_count(), 1);
    assert_eq!(generation.status, GenerationStatus::Completed);
    assert!(generation.sources.is_empty());
    assert!(provider.calls()[0].tools.is_empty());
}

#[tokio::test]
async fn test_single_search_round_collects_sources() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_response(
            "toolu_1",
            SEARCH_COURSE_CONTENT,
            json!({"query": "MCP servers"}),
        ),
        text_response("MCP servers expose tools."),
    ]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("Why MCP servers?").with_tools(&dispatcher))
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(generation.text, "MCP servers expose tools.");
    assert_eq!(generation.rounds, 1);

    let expected = vec![
        Source::new(
            format!("{} - Lesson 2", MCP_COURSE),
            Some("https://example.com/mcp/2".to_string()),
        ),
        Source::new(
            format!("{} - Lesson 1", MCP_COURSE),
            Some("https://example.com/mcp/1".to_string()),
        ),
    ];
    assert_eq!(generation.sources, expected);
    assert_eq!(dispatcher.last_sources(), expected);
}

#[tokio::test]
async fn test_two_rounds_then_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_response("toolu_1", GET_COURSE_OUTLINE, json!({"course_title": "mcp"})),
        tool_use_response(
            "toolu_2",
            SEARCH_COURSE_CONTENT,
            json!({"query": "MCP introduction", "course_name": "MCP", "lesson_number": 1}),
        ),
        text_response("Lesson 1 introduces MCP."),
    ]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("What does lesson 1 cover?").with_tools(&dispatcher))
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 3);
    assert_eq!(generation.text, "Lesson 1 introduces MCP.");
    assert_eq!(generation.status, GenerationStatus::Completed);
    assert_eq!(generation.rounds, 2);

    let calls = provider.calls();
    let roles: Vec<MessageRole> = calls[2].messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
        ]
    );
    // Still a tool-enabled call: the model chose to stop on its own.
    assert_eq!(calls[2].tools.len(), 2);

    assert_eq!(
        generation.sources,
        vec![Source::new(
            format!("{} - Lesson 1", MCP_COURSE),
            Some("https://example.com/mcp/1".to_string()),
        )]
    );
}

#[tokio::test]
async fn test_budget_exhaustion_forces_tool_free_final_call() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_response("toolu_1", SEARCH_COURSE_CONTENT, json!({"query": "MCP"})),
        tool_use_response("toolu_2", SEARCH_COURSE_CONTENT, json!({"query": "servers"})),
        tool_uses_response(
            Some("Here is what I found so far."),
            vec![("toolu_3", SEARCH_COURSE_CONTENT, json!({"query": "more"}))],
        ),
    ]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("Tell me everything").with_tools(&dispatcher))
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 3);
    assert_eq!(generation.text, "Here is what I found so far.");
    assert_eq!(generation.status, GenerationStatus::RoundBudgetExhausted);
    assert_eq!(generation.rounds, 2);

    let calls = provider.calls();
    assert!(calls[0].tools.len() == 2 && calls[1].tools.len() == 2);
    assert!(calls[2].tools.is_empty());
    assert_eq!(calls[2].tool_choice, ToolChoice::None);
    assert_eq!(calls[0].tool_choice, ToolChoice::Auto);
}

#[tokio::test]
async fn test_failed_tool_is_contained_and_model_recovers() {
    let store = FlakyStore::new(sample_store(), 1);
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_response("toolu_1", SEARCH_COURSE_CONTENT, json!({"query": "MCP"})),
        tool_use_response("toolu_2", GET_COURSE_OUTLINE, json!({"course_title": "MCP"})),
        text_response("The MCP course has 2 lessons."),
    ]));
    let dispatcher = course_tools(Arc::new(store));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("How many lessons?").with_tools(&dispatcher))
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 3);
    assert_eq!(generation.text, "The MCP course has 2 lessons.");

    let results = tool_results(&provider.calls()[2].messages);
    assert_eq!(results.len(), 2);
    assert!(results[0].1, "round-1 failure should be flagged as an error");
    assert!(results[0].0.contains("vector index unavailable"));
    assert!(!results[1].1);
    assert!(results[1].0.contains("Lessons (2 total):"));

    assert_eq!(
        generation.sources,
        vec![Source::new(
            MCP_COURSE,
            Some("https://example.com/mcp".to_string())
        )]
    );
}

// ============================================================================
// Loop properties
// ============================================================================

#[tokio::test]
async fn test_call_count_never_exceeds_budget_plus_one() {
    for max_rounds in 1..=4u32 {
        let script = (0..10)
            .map(|i| {
                tool_use_response(
                    &format!("toolu_{}", i),
                    SEARCH_COURSE_CONTENT,
                    json!({"query": "MCP"}),
                )
            })
            .collect();
        let provider = Arc::new(ScriptedProvider::new(script));
        let dispatcher = course_tools(Arc::new(sample_store()));
        let orchestrator = Orchestrator::new(provider.clone(), config(max_rounds)).unwrap();

        let generation = orchestrator
            .generate(GenerateRequest::new("loop").with_tools(&dispatcher))
            .await
            .unwrap();

        assert_eq!(provider.call_count(), max_rounds as usize + 1);
        assert_eq!(generation.model_calls, max_rounds + 1);

        let calls = provider.calls();
        for (k, call) in calls.iter().enumerate() {
            assert_eq!(call.messages.len(), 1 + 2 * k);
            assert_eq!(call.tools.is_empty(), k == max_rounds as usize);
        }
    }
}

#[tokio::test]
async fn test_multiple_tool_calls_in_one_round_run_in_order() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_uses_response(
            None,
            vec![
                ("toolu_a", GET_COURSE_OUTLINE, json!({"course_title": "MCP"})),
                ("toolu_b", GET_COURSE_OUTLINE, json!({"course_title": "Retrieval"})),
            ],
        ),
        text_response("Both courses are short."),
    ]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("Compare the courses").with_tools(&dispatcher))
        .await
        .unwrap();

    let calls = provider.calls();
    assert_eq!(calls[1].messages.len(), 3);
    let results = tool_results(&calls[1].messages);
    assert!(results[0].0.starts_with(&format!("Course: {}", MCP_COURSE)));
    assert!(results[1].0.starts_with(&format!("Course: {}", RAG_COURSE)));

    // The last executed tool wins.
    assert_eq!(generation.sources[0].text, RAG_COURSE);
}

#[tokio::test]
async fn test_unknown_tool_reported_to_model() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_response("toolu_1", SEARCH_COURSE_CONTENT, json!({"query": "MCP servers"})),
        tool_use_response("toolu_2", "search_web", json!({"query": "MCP"})),
        text_response("done"),
    ]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(provider.clone(), config(3)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("q").with_tools(&dispatcher))
        .await
        .unwrap();

    let results = tool_results(&provider.calls()[2].messages);
    assert!(results[1].0.to_lowercase().contains("not found"));
    assert!(!results[1].1, "unknown tool should be plain result text");
    // An unknown tool leaves the previous sources in place.
    assert_eq!(generation.sources.len(), 2);
}

#[tokio::test]
async fn test_invalid_arguments_returned_as_error_result() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_response(
            "toolu_1",
            SEARCH_COURSE_CONTENT,
            json!({"query": "MCP", "lesson_number": "two"}),
        ),
        text_response("Sorry."),
    ]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("q").with_tools(&dispatcher))
        .await
        .unwrap();

    assert_eq!(generation.text, "Sorry.");
    let results = tool_results(&provider.calls()[1].messages);
    assert!(results[0].1);
    assert!(results[0].0.contains("lesson_number"));
    assert!(generation.sources.is_empty());
}

#[tokio::test]
async fn test_tool_use_stop_without_calls_is_terminal() {
    let provider = Arc::new(ScriptedProvider::new(vec![tool_uses_response(
        Some("Nothing to look up."),
        vec![],
    )]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("q").with_tools(&dispatcher))
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 1);
    assert_eq!(generation.text, "Nothing to look up.");
    assert_eq!(generation.status, GenerationStatus::Completed);
}

// ============================================================================
// Model failures
// ============================================================================

#[tokio::test]
async fn test_model_failure_mid_loop_becomes_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_response("toolu_1", SEARCH_COURSE_CONTENT, json!({"query": "MCP"})),
        Err(LlmError::RateLimited {
            message: "slow down".to_string(),
            retry_after: None,
        }),
    ]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(provider.clone(), config(2)).unwrap();

    let generation = orchestrator
        .generate(GenerateRequest::new("q").with_tools(&dispatcher))
        .await
        .unwrap();

    assert_eq!(
        generation.text,
        "Error communicating with AI: Rate limited: slow down"
    );
    assert!(matches!(generation.status, GenerationStatus::Degraded { .. }));
    assert_eq!(generation.rounds, 1);
}

#[tokio::test]
async fn test_final_call_failure_under_fail_policy() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_response("toolu_1", SEARCH_COURSE_CONTENT, json!({"query": "MCP"})),
        Err(LlmError::ServerError {
            message: "overloaded".to_string(),
            status: Some(529),
        }),
    ]));
    let dispatcher = course_tools(Arc::new(sample_store()));
    let orchestrator = Orchestrator::new(
        provider.clone(),
        OrchestratorConfig {
            on_model_error: ModelErrorPolicy::Fail,
            ..config(1)
        },
    )
    .unwrap();

    let err = orchestrator
        .generate(GenerateRequest::new("q").with_tools(&dispatcher))
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::FinalResponse(_)));
    assert_eq!(
        err.to_string(),
        "Error getting final response: Server error (529): overloaded"
    );
}
