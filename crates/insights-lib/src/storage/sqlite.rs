//! SQLite SEO optimization store
//!
//! The connection is guarded by a `Mutex` and every query runs on the
//! blocking thread pool.

use super::{NewSeoOptimization, Page, PageRequest, RepositoryError, SeoOptimization, SeoRepository};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "id, property_id, content_type, original_content, optimized_content, \
     meta_tags, structured_data, seo_score, recommendations, created_at";

/// SQLite-backed repository
#[derive(Clone)]
pub struct SqliteSeoRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSeoRepository {
    /// Open (or create) the database file and its schema
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::init(conn)
    }

    /// Private in-memory database
    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, RepositoryError> {
        create_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, RepositoryError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| RepositoryError::Task("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| RepositoryError::Task(e.to_string()))?
    }
}

fn create_tables(conn: &Connection) -> Result<(), RepositoryError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS seo_optimizations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            property_id TEXT NOT NULL,
            content_type TEXT NOT NULL,
            original_content TEXT NOT NULL,
            optimized_content TEXT NOT NULL,
            meta_tags TEXT NOT NULL,
            structured_data TEXT NOT NULL,
            seo_score REAL NOT NULL,
            recommendations TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_seo_optimizations_property \
         ON seo_optimizations(property_id, created_at)",
        [],
    )?;
    Ok(())
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<(SeoOptimization, i64)> {
    let created_at_ms: i64 = row.get(9)?;
    Ok((
        SeoOptimization {
            id: row.get(0)?,
            property_id: row.get(1)?,
            content_type: row.get(2)?,
            original_content: row.get(3)?,
            optimized_content: row.get(4)?,
            meta_tags: row.get(5)?,
            structured_data: row.get(6)?,
            seo_score: row.get(7)?,
            recommendations: row.get(8)?,
            created_at: DateTime::<Utc>::default(),
        },
        created_at_ms,
    ))
}

fn with_timestamp((mut record, millis): (SeoOptimization, i64)) -> Result<SeoOptimization, RepositoryError> {
    record.created_at = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| RepositoryError::Corrupt(format!("created_at {} out of range", millis)))?;
    Ok(record)
}

#[async_trait]
impl SeoRepository for SqliteSeoRepository {
    async fn save(&self, record: NewSeoOptimization) -> Result<SeoOptimization, RepositoryError> {
        self.with_conn(move |conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO seo_optimizations (property_id, content_type, original_content, \
                 optimized_content, meta_tags, structured_data, seo_score, recommendations, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.property_id,
                    record.content_type,
                    record.original_content,
                    record.optimized_content,
                    record.meta_tags,
                    record.structured_data,
                    record.seo_score,
                    record.recommendations,
                    created_at.timestamp_millis(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            // Round-trip through millis so reads compare equal to the saved value
            let created_at = Utc
                .timestamp_millis_opt(created_at.timestamp_millis())
                .single()
                .unwrap_or(created_at);
            Ok(SeoOptimization::from_new(id, record, created_at))
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SeoOptimization>, RepositoryError> {
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM seo_optimizations WHERE id = ?1", SELECT_COLUMNS),
                    params![id],
                    row_to_record,
                )
                .optional()?;
            row.map(with_timestamp).transpose()
        })
        .await
    }

    async fn find_by_property_id(
        &self,
        property_id: &str,
        page: PageRequest,
    ) -> Result<Page<SeoOptimization>, RepositoryError> {
        let property_id = property_id.to_string();
        self.with_conn(move |conn| {
            let total_count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM seo_optimizations WHERE property_id = ?1",
                params![property_id],
                |row| row.get(0),
            )?;

            let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM seo_optimizations WHERE property_id = ?1 \
                 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
                SELECT_COLUMNS
            ))?;
            let items = stmt
                .query_map(
                    params![property_id, page.size as i64, offset],
                    row_to_record,
                )?
                .map(|row| with_timestamp(row?))
                .collect::<Result<Vec<_>, RepositoryError>>()?;

            Ok(Page::new(items, total_count as usize, page))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(property_id: &str, score: f64) -> NewSeoOptimization {
        NewSeoOptimization {
            property_id: property_id.to_string(),
            content_type: "PROPERTY_LISTING".to_string(),
            original_content: "Sunny loft".to_string(),
            optimized_content: r#"{"title":"Loft"}"#.to_string(),
            meta_tags: r#"{"title":"Loft"}"#.to_string(),
            structured_data: "[]".to_string(),
            seo_score: score,
            recommendations: "[]".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let repo = SqliteSeoRepository::in_memory().unwrap();
        let saved = repo.save(record("p1", 0.8)).await.unwrap();

        let found = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert!(repo.find_by_id(saved.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_is_paginated_newest_first() {
        let repo = SqliteSeoRepository::in_memory().unwrap();
        for i in 0..5 {
            repo.save(record("p1", i as f64 / 10.0)).await.unwrap();
        }
        repo.save(record("p2", 0.9)).await.unwrap();

        let page = repo
            .find_by_property_id("p1", PageRequest::new(0, 3))
            .await
            .unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.items.len(), 3);
        assert!(page.has_more);
        assert!(page.items.windows(2).all(|w| w[0].id > w[1].id));

        let rest = repo
            .find_by_property_id("p1", PageRequest::new(1, 3))
            .await
            .unwrap();
        assert_eq!(rest.items.len(), 2);
        assert!(!rest.has_more);
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_empty() {
        let repo = SqliteSeoRepository::in_memory().unwrap();
        repo.save(record("p1", 0.5)).await.unwrap();

        let page = repo
            .find_by_property_id("p1", PageRequest::new(usize::MAX, 20))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 1);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_file_database_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seo.db");

        let id = {
            let repo = SqliteSeoRepository::open(&path).unwrap();
            repo.save(record("p1", 0.7)).await.unwrap().id
        };

        let reopened = SqliteSeoRepository::open(&path).unwrap();
        let found = reopened.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.property_id, "p1");
        assert_eq!(found.seo_score, 0.7);
    }
}
