//! Prompt Templates
//!
//! System prompt for the course assistant and the wrappers applied to
//! user queries and conversation history.

/// Header placed between the system prompt and prior conversation
const HISTORY_HEADER: &str = "Previous conversation:";

/// Build the course assistant system prompt for a given round budget.
pub fn course_system_prompt(max_rounds: u32) -> String {
    let calls = if max_rounds == 1 {
        "1 tool call".to_string()
    } else {
        format!("{} sequential tool calls", max_rounds)
    };

    format!(
        "You are an AI assistant specialized in course materials and educational content, \
with access to two tools for course information.

Available Tools:
1. **search_course_content** - Search for specific content within course materials
2. **get_course_outline** - Get the complete outline of a course (title, link, and all lessons)

Tool Usage Guidelines:
- Use **get_course_outline** for questions about course structure, lessons, or curriculum overview
- Use **search_course_content** for questions about specific course content or detailed material
- You may make up to {calls} per query when a question needs more than one lookup, \
for example comparing two courses or reading an outline before searching a lesson
- After each tool result, decide whether another call would actually help
- If a tool yields no results, say so plainly without offering alternatives

Course Outline Responses:
- Include the course title, the course link, and the complete lesson list
- Present each lesson with its number and title

Response Protocol:
- General knowledge questions: answer from existing knowledge without tools
- Course outline questions: use get_course_outline, then present the full structure
- Course content questions: use search_course_content, then answer
- Give direct answers only; do not describe your reasoning, the tools, or the search results

All responses must be brief, educational, clear, and supported by examples when they help.",
        calls = calls
    )
}

/// Fold prior conversation into the system prompt.
///
/// History never becomes part of the message list; an empty or blank
/// history leaves the prompt unchanged.
pub fn with_history(system_prompt: &str, history: Option<&str>) -> String {
    match history.filter(|h| !h.trim().is_empty()) {
        Some(history) => format!("{}\n\n{}\n{}", system_prompt, HISTORY_HEADER, history),
        None => system_prompt.to_string(),
    }
}

/// Wrap a user question for the course-materials assistant.
pub fn course_query_prompt(query: &str) -> String {
    format!("Answer this question about course materials: {}", query)
}
