//! In-Memory Knowledge Store
//!
//! A small `KnowledgeStore` backed by plain vectors, loaded from a JSON
//! catalog file. Course names resolve by case-insensitive match and content
//! search ranks chunks by keyword overlap with the query.
//!
//! This is what the CLI and the test suites run against. A real deployment
//! plugs a vector database in behind the same trait.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::knowledge::{
    ChunkMetadata, CourseOutline, KnowledgeStore, LessonEntry, SearchFailure, SearchRequest,
    SearchResults,
};

/// Default number of hits returned when a request carries no limit.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A chunk of lesson content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    pub course_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_number: Option<u32>,
    #[serde(default)]
    pub chunk_index: usize,
}

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub courses: Vec<CourseOutline>,
    #[serde(default)]
    pub chunks: Vec<CourseChunk>,
}

/// Knowledge store holding the whole catalog in memory.
#[derive(Debug, Clone)]
pub struct InMemoryKnowledgeStore {
    courses: Vec<CourseOutline>,
    chunks: Vec<CourseChunk>,
    max_results: usize,
}

impl InMemoryKnowledgeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            courses: Vec::new(),
            chunks: Vec::new(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Build a store from a parsed catalog.
    pub fn from_catalog(catalog: CatalogFile) -> Self {
        Self {
            courses: catalog.courses,
            chunks: catalog.chunks,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Parse a catalog from a JSON string and check it.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let catalog: CatalogFile = serde_json::from_str(json)?;
        check_catalog(&catalog)?;
        Ok(Self::from_catalog(catalog))
    }

    /// Override the default result limit.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Add a course to the catalog. A course with the same title is replaced.
    pub fn add_course(&mut self, course: CourseOutline) {
        self.courses.retain(|c| c.title != course.title);
        self.courses.push(course);
    }

    /// Add a content chunk.
    pub fn add_chunk(&mut self, chunk: CourseChunk) {
        self.chunks.push(chunk);
    }

    /// Number of courses in the catalog.
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    /// Number of content chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn find_course(&self, title: &str) -> Option<&CourseOutline> {
        self.courses.iter().find(|c| c.title == title)
    }

    /// Exact (case-insensitive) title first, then substring either way.
    fn resolve(&self, partial: &str) -> Option<&CourseOutline> {
        let needle = partial.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(course) = self
            .courses
            .iter()
            .find(|c| c.title.to_lowercase() == needle)
        {
            return Some(course);
        }

        self.courses.iter().find(|c| {
            let title = c.title.to_lowercase();
            title.contains(&needle) || needle.contains(&title)
        })
    }

    fn tokenize(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_string())
            .collect()
    }

    /// Fraction of query terms present in the chunk.
    fn score(query_terms: &HashSet<String>, chunk: &str) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }
        let chunk_terms = Self::tokenize(chunk);
        let overlap = query_terms.intersection(&chunk_terms).count() as f32;
        (overlap / query_terms.len() as f32).min(1.0)
    }
}

impl Default for InMemoryKnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn search(&self, request: SearchRequest) -> CoreResult<SearchResults> {
        let course_filter = match request.course_name.as_deref() {
            Some(name) => match self.resolve(name) {
                Some(course) => Some(course.title.clone()),
                None => {
                    return Ok(SearchResults::failed(SearchFailure::CourseNotFound(
                        name.to_string(),
                    )))
                }
            },
            None => None,
        };

        let query_terms = Self::tokenize(&request.query);
        let mut scored: Vec<(f32, &CourseChunk)> = self
            .chunks
            .iter()
            .filter(|chunk| {
                course_filter
                    .as_deref()
                    .map_or(true, |title| chunk.course_title == title)
            })
            .filter(|chunk| {
                request
                    .lesson_number
                    .map_or(true, |n| chunk.lesson_number == Some(n))
            })
            .map(|chunk| (Self::score(&query_terms, &chunk.content), chunk))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Stable sort keeps catalog order among equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(request.limit.unwrap_or(self.max_results));

        let mut results = SearchResults::default();
        for (score, chunk) in scored {
            results.documents.push(chunk.content.clone());
            results.metadata.push(ChunkMetadata {
                course_title: Some(chunk.course_title.clone()),
                lesson_number: chunk.lesson_number,
            });
            results.distances.push(1.0 - score);
        }
        Ok(results)
    }

    async fn resolve_course_name(&self, partial: &str) -> CoreResult<Option<String>> {
        Ok(self.resolve(partial).map(|c| c.title.clone()))
    }

    async fn get_lesson_link(
        &self,
        course_title: &str,
        lesson_number: Option<u32>,
    ) -> CoreResult<Option<String>> {
        let Some(course) = self.find_course(course_title) else {
            return Ok(None);
        };
        let link = match lesson_number {
            Some(n) => course
                .lessons
                .iter()
                .find(|l: &&LessonEntry| l.number == n)
                .and_then(|l| l.link.clone()),
            None => course.course_link.clone(),
        };
        Ok(link)
    }

    async fn get_course_outline(&self, course_title: &str) -> CoreResult<Option<CourseOutline>> {
        Ok(self.find_course(course_title).cloned())
    }
}

/// Validate that every chunk references a known course.
///
/// Orphan chunks would be searchable but could never resolve a link, which
/// usually means the catalog file was assembled by hand and is stale.
pub fn check_catalog(catalog: &CatalogFile) -> CoreResult<()> {
    let titles: HashSet<&str> = catalog.courses.iter().map(|c| c.title.as_str()).collect();
    if let Some(orphan) = catalog
        .chunks
        .iter()
        .find(|chunk| !titles.contains(chunk.course_title.as_str()))
    {
        return Err(CoreError::validation(format!(
            "chunk {} references unknown course '{}'",
            orphan.chunk_index, orphan.course_title
        )));
    }
    Ok(())
}
