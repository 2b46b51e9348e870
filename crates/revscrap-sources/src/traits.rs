use async_trait::async_trait;
use revscrap_models::{AppRef, Store};
use crate::error::FetchError;
use crate::raw::RawReview;

/// What a store knows about an app before any review is fetched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    pub name: Option<String>,
}

/// One app marketplace able to list reviews for an app.
///
/// Every call performs fresh network I/O; nothing is retained between calls.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    fn store(&self) -> Store;

    fn source_name(&self) -> &str {
        self.store().as_str()
    }

    /// Confirm the app exists. Returns `FetchError::NotFound` when the store has no such listing.
    async fn lookup_app(&self, app: &AppRef) -> Result<AppInfo, FetchError>;

    /// Fetch all reviews up to the source's configured limit, newest first
    async fn fetch_reviews(&self, app: &AppRef) -> Result<Vec<RawReview>, FetchError>;
}
