//! Course Assistant Tools
//!
//! Tool interface and dispatch for the Course Assistant:
//! - `Tool` trait - unified tool interface, plus `FunctionTool` for closures
//! - `ToolOutput` / `Source` - tool result text and its provenance
//! - `validate_arguments` - schema check applied before every execution
//! - `ToolDispatcher` - registration, dispatch, error containment, sources
//! - `impls` - the course content search and course outline tools

pub mod dispatcher;
pub mod executor;
pub mod impls;
pub mod schema;
pub mod trait_def;

pub use dispatcher::ToolDispatcher;
pub use executor::{ToolError, ToolExecution};
pub use impls::{
    course_tools, CourseOutlineTool, SearchCourseContentTool, GET_COURSE_OUTLINE,
    SEARCH_COURSE_CONTENT,
};
pub use schema::validate_arguments;
pub use trait_def::{FunctionTool, FunctionToolHandler, Source, Tool, ToolFuture, ToolOutput};
