//! Knowledge Store Contract
//!
//! The retrieval tools never talk to a vector database directly. They go
//! through the `KnowledgeStore` trait defined here, which exposes exactly the
//! four operations the tools need: content search, fuzzy course-name
//! resolution, lesson-link lookup, and catalog (outline) lookup.
//!
//! Embedding, similarity, and ingestion are the store's business; this crate
//! only fixes the shape of requests and results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CoreResult;

/// Parameters for a content search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    /// Optional course filter; resolved fuzzily by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    /// Optional lesson filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_number: Option<u32>,
    /// Maximum number of results; the store's default applies when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// Create an unfiltered search request.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Restrict the search to a course.
    pub fn with_course(mut self, course_name: impl Into<String>) -> Self {
        self.course_name = Some(course_name.into());
        self
    }

    /// Restrict the search to a lesson number.
    pub fn with_lesson(mut self, lesson_number: u32) -> Self {
        self.lesson_number = Some(lesson_number);
        self
    }

    /// Cap the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Metadata attached to one search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_title: Option<String>,
    pub lesson_number: Option<u32>,
}

/// A store-reported search failure.
///
/// Carried inside `SearchResults` rather than as an `Err`, because the
/// search tool shows these messages to the model as ordinary text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SearchFailure {
    /// The course filter did not resolve to any known course.
    #[error("No course found matching '{0}'")]
    CourseNotFound(String),
    /// Any other backend-reported failure, shown verbatim.
    #[error("{0}")]
    Backend(String),
}

/// Parallel-array search results, in relevance order.
///
/// `documents[i]`, `metadata[i]` and `distances[i]` describe the same hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
    pub distances: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchFailure>,
}

impl SearchResults {
    /// Results carrying only a failure.
    pub fn failed(failure: SearchFailure) -> Self {
        Self {
            error: Some(failure),
            ..Default::default()
        }
    }

    /// Number of hits.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether there are no hits.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate hits as (document, metadata) pairs.
    ///
    /// Hits whose metadata entry is missing are yielded with empty metadata
    /// rather than dropped, so a sloppy backend cannot silently lose content.
    pub fn hits(&self) -> impl Iterator<Item = (&str, ChunkMetadata)> + '_ {
        self.documents.iter().enumerate().map(move |(i, doc)| {
            let meta = self.metadata.get(i).cloned().unwrap_or(ChunkMetadata {
                course_title: None,
                lesson_number: None,
            });
            (doc.as_str(), meta)
        })
    }
}

/// One lesson in a course catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonEntry {
    pub number: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A course catalog entry: title, link and the ordered lesson list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_link: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonEntry>,
}

/// Retrieval backend consumed by the course tools.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Search course content.
    ///
    /// Store-level conditions such as an unresolvable course filter are
    /// reported through `SearchResults::error`; `Err` is reserved for the
    /// store itself being broken.
    async fn search(&self, request: SearchRequest) -> CoreResult<SearchResults>;

    /// Resolve a partial or misspelled course name to a catalog title.
    async fn resolve_course_name(&self, partial: &str) -> CoreResult<Option<String>>;

    /// Link for a lesson of a course (or the course itself when no lesson
    /// number is given).
    async fn get_lesson_link(
        &self,
        course_title: &str,
        lesson_number: Option<u32>,
    ) -> CoreResult<Option<String>>;

    /// Catalog entry for an already-resolved course title.
    async fn get_course_outline(&self, course_title: &str) -> CoreResult<Option<CourseOutline>>;
}
