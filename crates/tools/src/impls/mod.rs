//! Retrieval tool implementations

mod course_outline;
mod search_content;

use std::sync::Arc;

use course_assistant_core::KnowledgeStore;

use crate::dispatcher::ToolDispatcher;

pub use course_outline::{CourseOutlineTool, GET_COURSE_OUTLINE};
pub use search_content::{SearchCourseContentTool, SEARCH_COURSE_CONTENT};

/// Dispatcher with both course tools registered against one store.
pub fn course_tools(store: Arc<dyn KnowledgeStore>) -> ToolDispatcher {
    ToolDispatcher::new()
        .with_tool(Arc::new(SearchCourseContentTool::new(store.clone())))
        .with_tool(Arc::new(CourseOutlineTool::new(store)))
}
