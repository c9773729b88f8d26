//! Course Assistant - Rust Backend Library
//!
//! Answers questions about course materials with a model that may call
//! retrieval tools for a bounded number of rounds.
//! It includes:
//! - The bounded tool-calling orchestrator and the course assistant service
//! - Configuration and catalog storage
//! - Data models and utilities
//!
//! Tools live in `course-assistant-tools`, model providers in
//! `course-assistant-llm` and the knowledge store contract in
//! `course-assistant-core`.

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::AppConfig;
pub use services::orchestrator::{
    GenerateRequest, Generation, GenerationStatus, ModelErrorPolicy, Orchestrator,
    OrchestratorConfig, OrchestratorError,
};
pub use services::{CourseAssistant, QueryAnswer};
pub use storage::{load_catalog, ConfigService};
pub use utils::error::{AppError, AppResult};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`. Output goes to stderr so answers
/// on stdout stay clean. Calling this twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
