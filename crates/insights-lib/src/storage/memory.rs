//! In-memory SEO optimization store

use super::{NewSeoOptimization, Page, PageRequest, RepositoryError, SeoOptimization, SeoRepository};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Process-local store; ids start at 1
#[derive(Default)]
pub struct InMemorySeoRepository {
    records: DashMap<i64, SeoOptimization>,
    next_id: AtomicI64,
}

impl InMemorySeoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SeoRepository for InMemorySeoRepository {
    async fn save(&self, record: NewSeoOptimization) -> Result<SeoOptimization, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let saved = SeoOptimization::from_new(id, record, Utc::now());
        self.records.insert(id, saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SeoOptimization>, RepositoryError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_property_id(
        &self,
        property_id: &str,
        page: PageRequest,
    ) -> Result<Page<SeoOptimization>, RepositoryError> {
        let mut matching: Vec<SeoOptimization> = self
            .records
            .iter()
            .filter(|r| r.property_id == property_id)
            .map(|r| r.value().clone())
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total_count = matching.len();
        let items = matching
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .collect();

        Ok(Page::new(items, total_count, page))
    }
}
