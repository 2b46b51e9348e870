use revscrap_config::Config;
use revscrap_models::{AppRef, ReviewRecord, Store, StoreTarget};
use revscrap_sources::{FetchError, SourceRegistry};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use crate::cache::ReviewCache;
use crate::error::ScrapeError;
use crate::normalize::normalize_all;

/// Normalized reviews for one app, newest first as the store returned them
#[derive(Debug, Clone)]
pub struct FetchedReviews {
    pub store: Store,
    pub app: AppRef,
    /// Display name reported by the store lookup, if any
    pub app_name: Option<String>,
    pub records: Vec<ReviewRecord>,
}

impl FetchedReviews {
    pub fn iter(&self) -> impl Iterator<Item = &ReviewRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Uniform front door over the per-store review sources.
///
/// A fetch either yields every review the source returned or fails as a whole;
/// partial results never escape. Each call is independent, apart from the
/// optional cache of earlier successes.
#[derive(Clone)]
pub struct ReviewFetcher {
    registry: SourceRegistry,
    cache: Option<Arc<ReviewCache>>,
    timeout: Duration,
}

impl ReviewFetcher {
    pub fn new(registry: SourceRegistry, timeout: Duration) -> Self {
        Self {
            registry,
            cache: None,
            timeout,
        }
    }

    pub fn with_cache(mut self, cache: Arc<ReviewCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build a fetcher with real store clients and the configured cache
    pub fn from_config(config: &Config) -> Self {
        let fetcher = Self::new(SourceRegistry::from_config(config), config.fetch.timeout());
        if config.cache.enabled {
            fetcher.with_cache(Arc::new(ReviewCache::new(config.cache.ttl(), config.cache.max_entries)))
        } else {
            fetcher
        }
    }

    pub async fn fetch_target(&self, target: &StoreTarget) -> Result<Arc<FetchedReviews>, ScrapeError> {
        match target {
            StoreTarget::GooglePlay(app) => Ok(self.fetch(Store::GooglePlay, app).await?),
            StoreTarget::AppStore(app) => Ok(self.fetch(Store::AppStore, app).await?),
            StoreTarget::Invalid => Err(ScrapeError::InvalidUrl(
                "URL does not point at a Google Play or App Store app".to_string(),
            )),
        }
    }

    pub async fn fetch(&self, store: Store, app: &AppRef) -> Result<Arc<FetchedReviews>, FetchError> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(store, app) {
                debug!(store = %store, app_id = %app.app_id, reviews = cached.len(), "Serving reviews from cache");
                return Ok(cached);
            }
        }

        let source = self
            .registry
            .get(store)
            .ok_or_else(|| FetchError::transient(store, "no review source registered for this store"))?;

        info!(store = %store, app_id = %app.app_id, "Fetching reviews");
        let started = Instant::now();

        let fetch = async {
            let info = source.lookup_app(app).await?;
            let raw = source.fetch_reviews(app).await?;
            Ok::<_, FetchError>((info, raw))
        };

        let (info, raw) = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(store = %store, app_id = %app.app_id, "Fetch failed: {}", e);
                return Err(e);
            }
            Err(_) => {
                warn!(store = %store, app_id = %app.app_id, timeout_secs = self.timeout.as_secs(), "Fetch timed out");
                return Err(FetchError::transient(
                    store,
                    format!("timed out after {}s", self.timeout.as_secs()),
                ));
            }
        };

        let raw_count = raw.len();
        let records: Vec<ReviewRecord> = normalize_all(raw).collect();
        if records.len() < raw_count {
            warn!(
                store = %store,
                app_id = %app.app_id,
                dropped = raw_count - records.len(),
                "Dropped reviews with unusable ratings"
            );
        }

        info!(
            store = %store,
            app_id = %app.app_id,
            reviews = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched reviews"
        );

        let fetched = Arc::new(FetchedReviews {
            store,
            app: app.clone(),
            app_name: info.name,
            records,
        });

        if let Some(cache) = &self.cache {
            cache.insert(store, app, Arc::clone(&fetched));
        }

        Ok(fetched)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use revscrap_sources::{AppInfo, PlayReview, RawReview, ReviewSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn play_review(user: &str, content: &str, score: i64) -> RawReview {
        RawReview::GooglePlay(PlayReview {
            review_id: format!("gp:{}", user),
            user_name: user.to_string(),
            title: None,
            content: content.to_string(),
            score,
            thumbs_up_count: None,
            at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
            reply_content: None,
            replied_at: None,
            app_version: None,
        })
    }

    /// In-memory source for exercising the fetch adapter without a network
    pub(crate) struct MockSource {
        pub store: Store,
        pub outcome: Result<Vec<RawReview>, FetchError>,
        pub delay: Option<Duration>,
        pub calls: AtomicUsize,
    }

    impl MockSource {
        pub(crate) fn ok(store: Store, reviews: Vec<RawReview>) -> Self {
            Self {
                store,
                outcome: Ok(reviews),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing(store: Store, error: FetchError) -> Self {
            Self {
                store,
                outcome: Err(error),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReviewSource for MockSource {
        fn store(&self) -> Store {
            self.store
        }

        async fn lookup_app(&self, app: &AppRef) -> Result<AppInfo, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.outcome {
                Err(e) if e.is_not_found() => Err(e.clone()),
                _ => Ok(AppInfo {
                    name: Some(format!("Mock {}", app.app_id)),
                }),
            }
        }

        async fn fetch_reviews(&self, _app: &AppRef) -> Result<Vec<RawReview>, FetchError> {
            self.outcome.clone()
        }
    }

    fn fetcher_with(source: Arc<MockSource>) -> ReviewFetcher {
        let mut registry = SourceRegistry::new();
        registry.register(source);
        ReviewFetcher::new(registry, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_fetch_normalizes_reviews() {
        let source = Arc::new(MockSource::ok(
            Store::GooglePlay,
            vec![play_review("alice", "Great app", 5), play_review("bob", "Bad", 0)],
        ));
        let fetcher = fetcher_with(source);
        let fetched = fetcher
            .fetch(Store::GooglePlay, &AppRef::new("com.example.app"))
            .await
            .unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched.app_name.as_deref(), Some("Mock com.example.app"));
        assert_eq!(fetched.iter().next().unwrap().username(), "alice");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_app_not_found() {
        let source = Arc::new(MockSource::failing(
            Store::GooglePlay,
            FetchError::not_found(Store::GooglePlay, "com.missing"),
        ));
        let fetcher = fetcher_with(source);
        let target = StoreTarget::GooglePlay(AppRef::new("com.missing"));
        let err = fetcher.fetch_target(&target).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AppNotFound);
    }

    #[tokio::test]
    async fn test_invalid_target_is_invalid_url() {
        let fetcher = ReviewFetcher::new(SourceRegistry::new(), Duration::from_secs(5));
        let err = fetcher.fetch_target(&StoreTarget::Invalid).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    }

    #[tokio::test]
    async fn test_unregistered_store_is_transient() {
        let fetcher = ReviewFetcher::new(SourceRegistry::new(), Duration::from_secs(5));
        let err = fetcher
            .fetch(Store::AppStore, &AppRef::new("284882215"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transient { store: Store::AppStore, .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let mut source = MockSource::ok(Store::AppStore, Vec::new());
        source.delay = Some(Duration::from_millis(500));
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(source));
        let fetcher = ReviewFetcher::new(registry, Duration::from_millis(20));

        let err = fetcher
            .fetch(Store::AppStore, &AppRef::new("284882215"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transient { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_fetches() {
        let source = Arc::new(MockSource::ok(
            Store::GooglePlay,
            vec![play_review("alice", "Great app", 5)],
        ));
        let fetcher = fetcher_with(Arc::clone(&source))
            .with_cache(Arc::new(ReviewCache::new(Duration::from_secs(60), 8)));
        let app = AppRef::new("com.example.app");

        let first = fetcher.fetch(Store::GooglePlay, &app).await.unwrap();
        let second = fetcher.fetch(Store::GooglePlay, &app).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let source = Arc::new(MockSource::failing(
            Store::GooglePlay,
            FetchError::transient(Store::GooglePlay, "503"),
        ));
        let fetcher = fetcher_with(Arc::clone(&source))
            .with_cache(Arc::new(ReviewCache::new(Duration::from_secs(60), 8)));
        let app = AppRef::new("com.example.app");

        assert!(fetcher.fetch(Store::GooglePlay, &app).await.is_err());
        assert!(fetcher.fetch(Store::GooglePlay, &app).await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
