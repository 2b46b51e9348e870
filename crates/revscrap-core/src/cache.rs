use revscrap_models::{AppRef, Store};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;
use crate::fetcher::FetchedReviews;

/// Key: (store, app_id, country, lang). The URL slug does not change the listing.
type CacheKey = (Store, String, Option<String>, Option<String>);

struct CacheEntry {
    inserted_at: Instant,
    reviews: Arc<FetchedReviews>,
}

/// Short-lived in-memory cache of successful fetches.
///
/// Lets a user download the same app twice without hitting the store again.
/// Failures are never stored. When full, the oldest entry is evicted.
pub struct ReviewCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl ReviewCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(store: Store, app: &AppRef) -> CacheKey {
        (store, app.app_id.clone(), app.country.clone(), app.lang.clone())
    }

    pub fn get(&self, store: Store, app: &AppRef) -> Option<Arc<FetchedReviews>> {
        let key = Self::key(store, app);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(Arc::clone(&entry.reviews)),
            Some(_) => {
                debug!(store = %store, app_id = %app.app_id, "Cache entry expired");
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, store: Store, app: &AppRef, reviews: Arc<FetchedReviews>) {
        let key = Self::key(store, app);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                reviews,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
