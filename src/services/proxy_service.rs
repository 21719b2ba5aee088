// src/services/proxy_service.rs
// DOCUMENTATION: Cache orchestration for nearby search
// PURPOSE: Serve from cache when possible, refresh in the background on hits,
// fetch synchronously on misses

use crate::errors::ProxyError;
use crate::services::{CacheStore, LocationNormalizer, PlacesFetcher};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// A response ready to be written to the client
#[derive(Debug, Clone)]
pub struct ServedPlaces {
    pub body: Bytes,
    pub cache_status: CacheStatus,
}

/// Cache orchestrator
/// DOCUMENTATION: Owns every cache write. On a hit the cached bytes are
/// returned at once and a detached task refreshes the entry; on a miss the
/// upstream is queried inline and the result cached before returning.
#[derive(Clone)]
pub struct PlacesProxy {
    normalizer: LocationNormalizer,
    fetcher: Arc<dyn PlacesFetcher>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    refresh_timeout: Duration,
}

impl PlacesProxy {
    pub fn new(
        normalizer: LocationNormalizer,
        fetcher: Arc<dyn PlacesFetcher>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            normalizer,
            fetcher,
            cache,
            ttl,
            refresh_timeout,
        }
    }

    /// Serve a nearby search request
    ///
    /// # Arguments
    /// * `raw_location` - "lat,lng" as supplied by the client
    /// * `radius` - Forwarded to the upstream untouched
    ///
    /// # Returns
    /// The cached bytes (hit) or freshly fetched bytes (miss)
    pub async fn serve(&self, raw_location: &str, radius: &str) -> Result<ServedPlaces, ProxyError> {
        let location = self.normalizer.normalize(raw_location)?;

        if let Some(cached) = self.cache.get(&location).await {
            self.spawn_refresh(location, radius.to_string());
            return Ok(ServedPlaces {
                body: cached,
                cache_status: CacheStatus::Hit,
            });
        }

        let body = self.fetcher.fetch_places(&location, radius).await.map_err(|e| {
            log::error!("Nearby search for {} failed: {}", location, e);
            e
        })?;

        // Caching is best effort; the client still gets the fresh body.
        if let Err(e) = self.cache.set(&location, body.clone(), self.ttl).await {
            log::warn!("Failed to cache nearby search for {}: {}", location, e);
        }

        Ok(ServedPlaces {
            body,
            cache_status: CacheStatus::Miss,
        })
    }

    /// Fire-and-forget refresh of a cached entry
    /// DOCUMENTATION: The task is detached; its outcome is only logged.
    /// A panic inside it is contained by the runtime.
    fn spawn_refresh(&self, location: String, radius: String) {
        let fetcher = self.fetcher.clone();
        let cache = self.cache.clone();
        let ttl = self.ttl;
        let refresh_timeout = self.refresh_timeout;

        tokio::spawn(async move {
            let fetched =
                match tokio::time::timeout(refresh_timeout, fetcher.fetch_places(&location, &radius)).await {
                    Ok(result) => result,
                    Err(_) => {
                        log::warn!(
                            "Background refresh for {} timed out after {}s",
                            location,
                            refresh_timeout.as_secs()
                        );
                        return;
                    }
                };

            match fetched {
                Ok(body) => {
                    if let Err(e) = cache.set(&location, body, ttl).await {
                        log::warn!("Background refresh for {} not cached: {}", location, e);
                    } else {
                        log::debug!("Background refresh for {} stored", location);
                    }
                }
                Err(e) => {
                    log::warn!("Background refresh for {} failed: {}", location, e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryCache;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::{mpsc, Notify};
    use tokio_test::{assert_err, assert_ok};

    const TTL: Duration = Duration::from_secs(600);
    const FRESH: &[u8] = br#"{"results":[{"geometry":{"location":{"lat":37.4,"lng":-122.08}}}]}"#;
    const STALE: &[u8] = br#"{"results":[]}"#;

    /// Fetcher double that records calls and can be held back or made to fail
    struct StubFetcher {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String)>>,
        fail: bool,
        gate: Option<Arc<Notify>>,
        done: Option<mpsc::UnboundedSender<()>>,
    }

    impl StubFetcher {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                fail: false,
                gate: None,
                done: None,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlacesFetcher for StubFetcher {
        async fn fetch_places(&self, location: &str, radius: &str) -> Result<Bytes, ProxyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((location.to_string(), radius.to_string()));

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            let result = if self.fail {
                Err(ProxyError::FetchFailed("upstream unavailable".to_string()))
            } else {
                Ok(Bytes::from_static(FRESH))
            };

            if let Some(done) = &self.done {
                let _ = done.send(());
            }
            result
        }
    }

    /// Store double that records TTLs and can refuse writes
    #[derive(Default)]
    struct RecordingCache {
        inner: MemoryCache,
        ttls: Mutex<Vec<(String, Duration)>>,
        reject_writes: bool,
        written: Option<mpsc::UnboundedSender<()>>,
    }

    #[async_trait]
    impl CacheStore for RecordingCache {
        async fn get(&self, key: &str) -> Option<Bytes> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), ProxyError> {
            let result = if self.reject_writes {
                Err(ProxyError::CacheError("store offline".to_string()))
            } else {
                self.ttls.lock().unwrap().push((key.to_string(), ttl));
                self.inner.set(key, value, ttl).await
            };
            if let Some(written) = &self.written {
                let _ = written.send(());
            }
            result
        }
    }

    fn proxy(fetcher: Arc<StubFetcher>, cache: Arc<RecordingCache>) -> PlacesProxy {
        PlacesProxy::new(
            LocationNormalizer::default(),
            fetcher,
            cache,
            TTL,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_populates_cache() {
        let fetcher = Arc::new(StubFetcher::ok());
        let cache = Arc::new(RecordingCache::default());
        let proxy = proxy(fetcher.clone(), cache.clone());

        let served = assert_ok!(proxy.serve("37.42,-122.08", "500").await);

        assert_eq!(served.cache_status, CacheStatus::Miss);
        assert_eq!(&served.body[..], FRESH);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(
            fetcher.seen.lock().unwrap().as_slice(),
            &[("37.42,-122.08".to_string(), "500".to_string())]
        );
        assert_eq!(cache.get("37.42,-122.08").await, Some(Bytes::from_static(FRESH)));
        assert_eq!(
            cache.ttls.lock().unwrap().as_slice(),
            &[("37.42,-122.08".to_string(), TTL)]
        );
    }

    #[tokio::test]
    async fn test_miss_uses_normalized_key() {
        let fetcher = Arc::new(StubFetcher::ok());
        let cache = Arc::new(RecordingCache::default());
        let proxy = proxy(fetcher.clone(), cache.clone());

        assert_ok!(proxy.serve("37.4219999,-122.0840575", "500").await);

        assert_eq!(fetcher.seen.lock().unwrap()[0].0, "37.42,-122.08");
        assert!(cache.get("37.42,-122.08").await.is_some());
    }

    #[tokio::test]
    async fn test_invalid_location_never_reaches_upstream() {
        let fetcher = Arc::new(StubFetcher::ok());
        let cache = Arc::new(RecordingCache::default());
        let proxy = proxy(fetcher.clone(), cache.clone());

        let err = assert_err!(proxy.serve("not-a-location", "500").await);

        assert!(matches!(err, ProxyError::InvalidLocation(_)));
        assert_eq!(fetcher.calls(), 0);
        assert!(cache.ttls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_miss_fetch_failure_propagates_without_caching() {
        let fetcher = Arc::new(StubFetcher::failing());
        let cache = Arc::new(RecordingCache::default());
        let proxy = proxy(fetcher.clone(), cache.clone());

        let err = assert_err!(proxy.serve("37.42,-122.08", "500").await);

        assert!(matches!(err, ProxyError::FetchFailed(_)));
        assert!(cache.get("37.42,-122.08").await.is_none());
        assert!(cache.ttls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_miss_cache_write_failure_still_serves() {
        let fetcher = Arc::new(StubFetcher::ok());
        let cache = Arc::new(RecordingCache {
            reject_writes: true,
            ..Default::default()
        });
        let proxy = proxy(fetcher.clone(), cache.clone());

        let served = assert_ok!(proxy.serve("37.42,-122.08", "500").await);

        assert_eq!(&served.body[..], FRESH);
        assert!(cache.get("37.42,-122.08").await.is_none());
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_still_serves_fresh_body() {
        let fetcher = Arc::new(StubFetcher::ok());
        let cache = Arc::new(RecordingCache::default());
        let proxy = PlacesProxy::new(
            LocationNormalizer::default(),
            fetcher.clone(),
            cache.clone(),
            Duration::from_secs(u64::MAX),
            Duration::from_secs(5),
        );

        let served = assert_ok!(proxy.serve("37.42,-122.08", "500").await);

        assert_eq!(&served.body[..], FRESH);
        assert!(cache.get("37.42,-122.08").await.is_none());
    }

    #[tokio::test]
    async fn test_hit_returns_without_waiting_for_refresh() {
        let gate = Arc::new(Notify::new());
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let (written_tx, mut written_rx) = mpsc::unbounded_channel();
        let fetcher = Arc::new(StubFetcher {
            gate: Some(gate.clone()),
            done: Some(done_tx),
            ..StubFetcher::ok()
        });
        let cache = Arc::new(RecordingCache {
            written: Some(written_tx),
            ..Default::default()
        });
        assert_ok!(cache.inner.set("37.42,-122.08", Bytes::from_static(STALE), TTL).await);
        let proxy = proxy(fetcher.clone(), cache.clone());

        // The refresh is parked on the gate, so serve must not depend on it.
        let served = assert_ok!(
            tokio::time::timeout(Duration::from_secs(1), proxy.serve("37.42,-122.08", "500"))
                .await
                .expect("hit path blocked on refresh")
        );

        assert_eq!(served.cache_status, CacheStatus::Hit);
        assert_eq!(&served.body[..], STALE);

        // Release the refresh and wait for it to land in the cache.
        tokio::time::timeout(Duration::from_secs(1), async {
            while fetcher.calls() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("refresh was never spawned");
        gate.notify_one();
        done_rx.recv().await.unwrap();
        written_rx.recv().await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.get("37.42,-122.08").await, Some(Bytes::from_static(FRESH)));
        assert_eq!(
            cache.ttls.lock().unwrap().as_slice(),
            &[("37.42,-122.08".to_string(), TTL)]
        );
    }

    #[tokio::test]
    async fn test_hit_refresh_failure_is_swallowed() {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let fetcher = Arc::new(StubFetcher {
            done: Some(done_tx),
            ..StubFetcher::failing()
        });
        let cache = Arc::new(RecordingCache::default());
        assert_ok!(cache.inner.set("37.42,-122.08", Bytes::from_static(STALE), TTL).await);
        let proxy = proxy(fetcher.clone(), cache.clone());

        let served = assert_ok!(proxy.serve("37.42,-122.08", "500").await);
        assert_eq!(&served.body[..], STALE);

        done_rx.recv().await.unwrap();
        tokio::task::yield_now().await;

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.get("37.42,-122.08").await, Some(Bytes::from_static(STALE)));
        assert!(cache.ttls.lock().unwrap().is_empty());

        // The stale entry keeps being served.
        let again = assert_ok!(proxy.serve("37.42,-122.08", "500").await);
        assert_eq!(again.cache_status, CacheStatus::Hit);
        assert_eq!(&again.body[..], STALE);
    }

    #[tokio::test]
    async fn test_hit_refresh_times_out_without_touching_cache() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(StubFetcher {
            gate: Some(gate),
            ..StubFetcher::ok()
        });
        let cache = Arc::new(RecordingCache::default());
        assert_ok!(cache.inner.set("37.42,-122.08", Bytes::from_static(STALE), TTL).await);
        let proxy = PlacesProxy::new(
            LocationNormalizer::default(),
            fetcher.clone(),
            cache.clone(),
            TTL,
            Duration::from_millis(20),
        );

        assert_ok!(proxy.serve("37.42,-122.08", "500").await);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.get("37.42,-122.08").await, Some(Bytes::from_static(STALE)));
    }
}
