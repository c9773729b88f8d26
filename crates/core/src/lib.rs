//! Course Assistant Core
//!
//! Foundational error types and the knowledge store contract shared by the
//! Course Assistant workspace. This crate has no dependency on LLM providers
//! or application-level code.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `knowledge` - Knowledge store trait and search/catalog data types
//! - `memory_store` - In-memory knowledge store loaded from a JSON catalog

pub mod error;
pub mod knowledge;
pub mod memory_store;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Knowledge Store ────────────────────────────────────────────────────
pub use knowledge::{
    ChunkMetadata, CourseOutline, KnowledgeStore, LessonEntry, SearchFailure, SearchRequest,
    SearchResults,
};
pub use memory_store::{
    check_catalog, CatalogFile, CourseChunk, InMemoryKnowledgeStore, DEFAULT_MAX_RESULTS,
};
