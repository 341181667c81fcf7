use chrono::{DateTime, TimeDelta, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::LectureTasks;
use crate::services::task_parser::TasksParser;

/// Stored value and the moment it stops being served. `None` never expires.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: Option<DateTime<Utc>>,
}

impl<T> CacheEntry<T> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|deadline| now <= deadline)
    }
}

/// Deadline `ttl_seconds` after `now`, `None` when it is past chrono's range.
/// Negative TTLs count as zero.
fn deadline_after(now: DateTime<Utc>, ttl_seconds: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(ttl_seconds.max(0)).and_then(|ttl| now.checked_add_signed(ttl))
}

/// Shared map whose entries lapse a fixed number of seconds after insertion
#[derive(Clone)]
pub struct TimedCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl_seconds: i64,
}

impl<K, V> TimedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_seconds,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        let expires_at = deadline_after(Utc::now(), self.ttl_seconds);
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { value, expires_at });
    }

    /// Drop lapsed entries, returns how many went
    pub async fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Parsed tasks cache - keyed by content hash, so any edit to the text misses
#[derive(Clone)]
pub struct TasksCache {
    cache: TimedCache<String, LectureTasks>,
}

impl TasksCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            cache: TimedCache::new(ttl_seconds),
        }
    }

    /// Generate hash key from raw tasks text
    fn generate_key(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub async fn get_or_parse(&self, content: &str, parser: &TasksParser) -> LectureTasks {
        let key = Self::generate_key(content);
        if let Some(tasks) = self.cache.get(&key).await {
            return tasks;
        }

        let tasks = parser.parse(content);
        self.cache.insert(key, tasks.clone()).await;
        tasks
    }

    pub async fn cleanup(&self) -> usize {
        self.cache.evict_expired().await
    }

    pub async fn len(&self) -> usize {
        self.cache.len().await
    }
}

impl Default for TasksCache {
    fn default() -> Self {
        // 1 hour
        Self::new(60 * 60)
    }
}
