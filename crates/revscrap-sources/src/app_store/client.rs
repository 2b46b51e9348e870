use async_trait::async_trait;
use reqwest::Client;
use revscrap_config::AppStoreConfig;
use revscrap_models::{AppRef, Store};
use std::sync::Arc;
use tracing::{debug, info};
use crate::app_store::api::{self, ReviewQuery};
use crate::error::FetchError;
use crate::http::create_http_client;
use crate::raw::RawReview;
use crate::traits::{AppInfo, ReviewSource};

#[derive(Clone)]
pub struct AppStoreClient {
    client: Arc<Client>,
    base_url: String,
    web_base_url: String,
    reviews_base_url: String,
    country: String,
    lang: String,
    page_size: u32,
    max_reviews: usize,
}

impl AppStoreClient {
    pub fn new(config: &AppStoreConfig) -> Self {
        Self {
            client: Arc::new(create_http_client()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            web_base_url: config.web_base_url.trim_end_matches('/').to_string(),
            reviews_base_url: config.reviews_base_url.trim_end_matches('/').to_string(),
            country: config.country.clone(),
            lang: config.lang.clone(),
            page_size: config.page_size.max(1),
            max_reviews: config.max_reviews.max(1),
        }
    }

    fn country<'a>(&'a self, app: &'a AppRef) -> &'a str {
        app.country.as_deref().unwrap_or(&self.country)
    }
}

#[async_trait]
impl ReviewSource for AppStoreClient {
    fn store(&self) -> Store {
        Store::AppStore
    }

    async fn lookup_app(&self, app: &AppRef) -> Result<AppInfo, FetchError> {
        let name = api::lookup_app(&self.client, &self.base_url, &app.app_id, self.country(app)).await?;
        Ok(AppInfo { name })
    }

    async fn fetch_reviews(&self, app: &AppRef) -> Result<Vec<RawReview>, FetchError> {
        let country = self.country(app);
        let page_url = api::app_page_url(&self.web_base_url, country, &app.app_id, app.slug.as_deref());
        let token = api::fetch_token(&self.client, &page_url, &app.app_id).await?;

        let query = ReviewQuery {
            base_url: &self.reviews_base_url,
            app_id: &app.app_id,
            country,
            lang: &self.lang,
            token: &token,
            limit: self.page_size,
        };

        let mut reviews = Vec::new();
        let mut offset = 0;
        loop {
            let page = api::fetch_review_page(&self.client, &query, offset).await?;
            debug!(app_id = %app.app_id, offset = offset, received = page.reviews.len(), "Fetched App Store review page");
            if page.reviews.is_empty() {
                break;
            }
            reviews.extend(page.reviews.into_iter().map(RawReview::AppStore));

            if reviews.len() >= self.max_reviews {
                reviews.truncate(self.max_reviews);
                break;
            }
            match page.next_offset {
                Some(next) if next > offset => offset = next,
                _ => break,
            }
        }

        info!(app_id = %app.app_id, country = %country, count = reviews.len(), "Fetched App Store reviews");
        Ok(reviews)
    }
}
