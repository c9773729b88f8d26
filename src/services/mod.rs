//! Services Module
//!
//! Query orchestration and the course assistant built on top of it.

pub mod assistant;
pub mod orchestrator;

pub use assistant::{CourseAssistant, QueryAnswer};
