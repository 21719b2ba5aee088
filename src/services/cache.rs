// src/services/cache.rs
// DOCUMENTATION: Cache store port and in-memory TTL adapter
// PURPOSE: Hold transformed nearby search responses keyed by canonical location

use crate::errors::ProxyError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Key-value store with per-entry TTL
/// DOCUMENTATION: The proxy only needs get and set; eviction belongs to the store
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the live value for `key`, if any
    async fn get(&self, key: &str) -> Option<Bytes>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), ProxyError>;
}

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry {
    data: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    /// None when the TTL reaches past what `Instant` can represent
    fn new(data: Bytes, ttl: Duration) -> Option<Self> {
        let expires_at = Instant::now().checked_add(ttl)?;
        Some(Self { data, expires_at })
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Simple in-memory cache with TTL
/// DOCUMENTATION: Thread-safe store for single-instance deployments
/// Last write wins for concurrent sets on the same key
#[derive(Default)]
pub struct MemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Bytes> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                log::debug!("Cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                log::debug!("Cache EXPIRED for key: {}", key);
                None
            }
            None => {
                log::debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), ProxyError> {
        let entry = CacheEntry::new(value, ttl).ok_or_else(|| {
            ProxyError::CacheError(format!("TTL of {}s is out of range", ttl.as_secs()))
        })?;

        let mut store = self.store.write().await;
        store.insert(key.to_string(), entry);
        log::debug!("Cache SET for key: {} (TTL: {}s)", key, ttl.as_secs());
        Ok(())
    }
}

/// Cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<MemoryCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}
