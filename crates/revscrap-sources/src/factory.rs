//! Registry of review sources, one per store.
//!
//! Built from configuration for production use; tests register their own
//! `ReviewSource` implementations instead.

use revscrap_config::Config;
use revscrap_models::Store;
use std::collections::HashMap;
use std::sync::Arc;
use crate::app_store::AppStoreClient;
use crate::google_play::GooglePlayClient;
use crate::traits::ReviewSource;

#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<Store, Arc<dyn ReviewSource>>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with both store clients configured
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GooglePlayClient::new(&config.google_play)));
        registry.register(Arc::new(AppStoreClient::new(&config.app_store)));
        registry
    }

    /// Register a source, replacing any previous source for the same store
    pub fn register(&mut self, source: Arc<dyn ReviewSource>) {
        self.sources.insert(source.store(), source);
    }

    pub fn get(&self, store: Store) -> Option<Arc<dyn ReviewSource>> {
        self.sources.get(&store).cloned()
    }

    pub fn is_registered(&self, store: Store) -> bool {
        self.sources.contains_key(&store)
    }
}
