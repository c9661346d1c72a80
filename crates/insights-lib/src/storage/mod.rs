//! Persistence of SEO optimization records
//!
//! The repository trait abstracts the store from the SEO facade. Two
//! adapters ship with the crate: an in-memory store and SQLite.

mod memory;
mod sqlite;

pub use memory::InMemorySeoRepository;
pub use sqlite::SqliteSeoRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid stored record: {0}")]
    Corrupt(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Record to insert; the store assigns id and creation time
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeoOptimization {
    pub property_id: String,
    pub content_type: String,
    pub original_content: String,
    /// JSON text of the generated content
    pub optimized_content: String,
    /// JSON text of the meta tags
    pub meta_tags: String,
    /// JSON text of the structured data objects
    pub structured_data: String,
    pub seo_score: f64,
    /// JSON text of the recommendations
    pub recommendations: String,
}

/// Persisted SEO optimization, never mutated after insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoOptimization {
    pub id: i64,
    pub property_id: String,
    pub content_type: String,
    pub original_content: String,
    pub optimized_content: String,
    pub meta_tags: String,
    pub structured_data: String,
    pub seo_score: f64,
    pub recommendations: String,
    pub created_at: DateTime<Utc>,
}

impl SeoOptimization {
    fn from_new(id: i64, record: NewSeoOptimization, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            property_id: record.property_id,
            content_type: record.content_type,
            original_content: record.original_content,
            optimized_content: record.optimized_content,
            meta_tags: record.meta_tags,
            structured_data: record.structured_data,
            seo_score: record.seo_score,
            recommendations: record.recommendations,
            created_at,
        }
    }
}

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub const MAX_SIZE: usize = 100;

    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    /// Saturates instead of overflowing for out-of-range page numbers
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

/// A page of records with pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page: usize,
    pub size: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: usize, request: PageRequest) -> Self {
        let has_more = request.offset().saturating_add(items.len()) < total_count;
        Self {
            items,
            total_count,
            page: request.page,
            size: request.size,
            has_more,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file; records are kept in memory when unset
    pub database_path: Option<PathBuf>,
}

/// Store of SEO optimization records
#[async_trait]
pub trait SeoRepository: Send + Sync {
    /// Insert a record and return it with its assigned id
    async fn save(&self, record: NewSeoOptimization) -> Result<SeoOptimization, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<SeoOptimization>, RepositoryError>;

    /// Records of one property, newest first
    async fn find_by_property_id(
        &self,
        property_id: &str,
        page: PageRequest,
    ) -> Result<Page<SeoOptimization>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps_size() {
        assert_eq!(PageRequest::new(0, 0).size, 1);
        assert_eq!(PageRequest::new(0, 1000).size, PageRequest::MAX_SIZE);
        assert_eq!(PageRequest::new(3, 10).offset(), 30);
        assert_eq!(PageRequest::new(usize::MAX, 20).offset(), usize::MAX);
    }

    #[test]
    fn test_page_has_more() {
        let page = Page::new(vec![1, 2], 5, PageRequest::new(0, 2));
        assert!(page.has_more);

        let last = Page::new(vec![5], 5, PageRequest::new(2, 2));
        assert!(!last.has_more);
    }
}
