use async_trait::async_trait;
use reqwest::Client;
use revscrap_config::GooglePlayConfig;
use revscrap_models::{AppRef, Store};
use std::sync::Arc;
use tracing::{debug, info};
use crate::error::FetchError;
use crate::google_play::api;
use crate::http::create_http_client;
use crate::raw::RawReview;
use crate::traits::{AppInfo, ReviewSource};

#[derive(Clone)]
pub struct GooglePlayClient {
    client: Arc<Client>,
    base_url: String,
    lang: String,
    country: String,
    batch_size: u32,
    max_reviews: usize,
}

impl GooglePlayClient {
    pub fn new(config: &GooglePlayConfig) -> Self {
        Self {
            client: Arc::new(create_http_client()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
            country: config.country.clone(),
            batch_size: config.batch_size.max(1),
            max_reviews: config.max_reviews,
        }
    }

    /// URL parameters win over configured defaults
    fn locale<'a>(&'a self, app: &'a AppRef) -> (&'a str, &'a str) {
        (
            app.lang.as_deref().unwrap_or(&self.lang),
            app.country.as_deref().unwrap_or(&self.country),
        )
    }
}

#[async_trait]
impl ReviewSource for GooglePlayClient {
    fn store(&self) -> Store {
        Store::GooglePlay
    }

    async fn lookup_app(&self, app: &AppRef) -> Result<AppInfo, FetchError> {
        let (lang, country) = self.locale(app);
        api::check_app_exists(&self.client, &self.base_url, &app.app_id, lang, country).await?;
        Ok(AppInfo::default())
    }

    async fn fetch_reviews(&self, app: &AppRef) -> Result<Vec<RawReview>, FetchError> {
        let (lang, country) = self.locale(app);
        let mut reviews = Vec::new();
        let mut token: Option<String> = None;
        let mut batch = 0;

        while reviews.len() < self.max_reviews {
            batch += 1;
            let remaining = self.max_reviews - reviews.len();
            let count = remaining.min(self.batch_size as usize) as u32;

            let page = api::fetch_review_page(
                &self.client,
                &self.base_url,
                &app.app_id,
                lang,
                country,
                count,
                token.as_deref(),
            )
            .await?;

            debug!(
                app_id = %app.app_id,
                batch = batch,
                received = page.reviews.len(),
                "Fetched Google Play review batch"
            );

            if page.reviews.is_empty() {
                break;
            }
            reviews.extend(page.reviews.into_iter().map(RawReview::GooglePlay));

            match page.continuation_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        reviews.truncate(self.max_reviews);
        info!(app_id = %app.app_id, count = reviews.len(), "Fetched Google Play reviews");
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google_play::api::tests::{batch_response, review_item};
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server, batch_size: u32, max_reviews: usize) -> GooglePlayClient {
        GooglePlayClient::new(&GooglePlayConfig {
            base_url: server.url(),
            batch_size,
            max_reviews,
            ..GooglePlayConfig::default()
        })
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/store/apps/details")
            .match_query(Matcher::UrlEncoded("id".into(), "com.missing.app".into()))
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server, 150, 100);
        let err = client.lookup_app(&AppRef::new("com.missing.app")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_lookup_uses_url_locale() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/store/apps/details")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "com.example.app".into()),
                Matcher::UrlEncoded("hl".into(), "it".into()),
                Matcher::UrlEncoded("gl".into(), "US".into()),
            ]))
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let client = client_for(&server, 150, 100);
        let app = AppRef::new("com.example.app")
            .with_lang(Some("it".to_string()))
            .with_country(Some("US".to_string()));
        assert!(client.lookup_app(&app).await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_follows_continuation_token() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/_/PlayStoreUi/data/batchexecute")
            .match_query(Matcher::Any)
            .match_body(Matcher::Regex("%5B2%2Cnull%2Cnull%5D".into()))
            .with_status(200)
            .with_body(batch_response(
                json!([
                    review_item("gp:1", "alice", "Great app", 5, 1_709_596_800),
                    review_item("gp:2", "bob", "Crashes", 1, 1_709_510_400),
                ]),
                Some("tok1"),
            ))
            .create_async()
            .await;
        let second = server
            .mock("POST", "/_/PlayStoreUi/data/batchexecute")
            .match_query(Matcher::Any)
            .match_body(Matcher::Regex("tok1".into()))
            .with_status(200)
            .with_body(batch_response(
                json!([
                    review_item("gp:3", "carol", "Fine", 3, 1_709_424_000),
                    review_item("gp:4", "dave", "Over the limit", 4, 1_709_337_600),
                ]),
                Some("tok2"),
            ))
            .create_async()
            .await;

        let client = client_for(&server, 2, 3);
        let reviews = client.fetch_reviews(&AppRef::new("com.example.app")).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(reviews.len(), 3);
        let ids: Vec<&str> = reviews
            .iter()
            .map(|r| match r {
                RawReview::GooglePlay(review) => review.review_id.as_str(),
                RawReview::AppStore(_) => panic!("unexpected App Store review"),
            })
            .collect();
        assert_eq!(ids, vec!["gp:1", "gp:2", "gp:3"]);
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/_/PlayStoreUi/data/batchexecute")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server, 150, 100);
        let err = client.fetch_reviews(&AppRef::new("com.example.app")).await.unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(err.store(), Store::GooglePlay);
    }
}
