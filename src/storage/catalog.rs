//! Course Catalog Loading
//!
//! Reads a JSON course catalog from disk into an in-memory knowledge store.

use std::fs;
use std::path::Path;
use tracing::info;

use course_assistant_core::InMemoryKnowledgeStore;

use crate::utils::error::{AppError, AppResult};

/// Load and check the catalog at `path`.
///
/// Content searches return at most `max_results` hits.
pub fn load_catalog(path: &Path, max_results: usize) -> AppResult<InMemoryKnowledgeStore> {
    if !path.exists() {
        return Err(AppError::not_found(format!(
            "catalog file {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let store = InMemoryKnowledgeStore::from_json(&content)?;

    info!(
        "Loaded catalog {}: {} courses, {} chunks",
        path.display(),
        store.course_count(),
        store.chunk_count()
    );
    Ok(store.with_max_results(max_results))
}
