//! Cache-aside wrapper for prediction results
//!
//! The store is a trait so a shared external cache can replace the
//! in-process one; the in-memory store only expires entries when a TTL
//! is configured.

use crate::observability::FacadeMetrics;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Key/value store backing a cache-aside wrapper
#[async_trait]
pub trait ResultCache<V>: Send + Sync {
    async fn get(&self, key: &str) -> Option<V>;

    async fn put(&self, key: String, value: V);

    async fn invalidate(&self, key: &str);
}

/// Cache settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds; entries live until evicted when unset
    pub ttl_secs: Option<u64>,
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Concurrent in-process cache
pub struct InMemoryCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Option<Duration>,
}

impl<V> InMemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: None,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: config.ttl_secs.map(Duration::from_secs),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        self.ttl
            .map(|ttl| entry.stored_at.elapsed() >= ttl)
            .unwrap_or(false)
    }
}

impl<V> Default for InMemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> ResultCache<V> for InMemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if !self.is_expired(&entry) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    async fn put(&self, key: String, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    async fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Composite cache key for resource usage predictions
pub fn resource_usage_key(resource_type: &str, period: &str) -> String {
    format!("resource-usage:{}:{}", resource_type, period)
}

/// Return the cached value for `key`, or compute it and store it when
/// `should_cache` accepts the fresh value
pub async fn cached<V, Fut>(
    cache: &dyn ResultCache<V>,
    cache_name: &str,
    key: String,
    compute: Fut,
    should_cache: impl FnOnce(&V) -> bool,
) -> V
where
    V: Clone,
    Fut: Future<Output = V>,
{
    let metrics = FacadeMetrics::new();

    if let Some(hit) = cache.get(&key).await {
        debug!(cache = cache_name, key = %key, "Cache hit");
        metrics.inc_cache_lookup(cache_name, true);
        return hit;
    }
    metrics.inc_cache_lookup(cache_name, false);

    let value = compute.await;
    if should_cache(&value) {
        cache.put(key, value.clone()).await;
    } else {
        debug!(cache = cache_name, key = %key, "Result not cached");
    }
    value
}
