pub mod classifier;
pub mod fetcher;
pub mod normalize;
pub mod export;
pub mod cache;
pub mod error;

pub use classifier::classify;
pub use fetcher::{FetchedReviews, ReviewFetcher};
pub use export::{CsvExport, CSV_HEADER};
pub use cache::ReviewCache;
pub use error::{ErrorKind, ScrapeError};

/// Classify a submitted URL, fetch its reviews and render them as CSV
pub async fn scrape(fetcher: &ReviewFetcher, url: &str) -> Result<CsvExport, ScrapeError> {
    let target = classify(url);
    let fetched = fetcher.fetch_target(&target).await?;
    Ok(CsvExport::from_reviews(&fetched)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::tests::{play_review, MockSource};
    use revscrap_config::Config;
    use revscrap_models::Store;
    use revscrap_sources::{FetchError, SourceRegistry};
    use std::sync::Arc;
    use std::time::Duration;

    fn fetcher_with(source: MockSource) -> ReviewFetcher {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(source));
        ReviewFetcher::new(registry, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_scrape_google_play_end_to_end() {
        let fetcher = fetcher_with(MockSource::ok(
            Store::GooglePlay,
            vec![play_review("alice", "Great app", 5)],
        ));
        let export = scrape(&fetcher, "https://play.google.com/store/apps/details?id=com.example.app")
            .await
            .unwrap();

        assert_eq!(export.filename, "playstore_com_example_app_reviews.csv");
        assert_eq!(export.review_count, 1);
        assert_eq!(
            String::from_utf8(export.content).unwrap(),
            "Datetime,Username,Review,Rating,Reply,Reply Datetime,Thumbs Up\n05/03/2024,alice,Great app,5,,,\n"
        );
    }

    #[tokio::test]
    async fn test_scrape_rejects_unknown_url() {
        let fetcher = fetcher_with(MockSource::ok(Store::GooglePlay, Vec::new()));
        let err = scrape(&fetcher, "https://example.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    }

    #[tokio::test]
    async fn test_scrape_not_found_produces_no_csv() {
        let fetcher = fetcher_with(MockSource::failing(
            Store::AppStore,
            FetchError::not_found(Store::AppStore, "284882215"),
        ));
        let err = scrape(&fetcher, "https://apps.apple.com/us/app/facebook/id284882215")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AppNotFound);
    }

    #[tokio::test]
    async fn test_scrape_app_store_fills_reply_columns() {
        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/lookup")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"resultCount":1,"results":[{"trackName":"Facebook"}]}"#)
            .create_async()
            .await;
        let _page = server
            .mock("GET", "/us/app/facebook/id284882215")
            .with_status(200)
            .with_body(r#"<meta name="web-experience-app/config/environment" content="%7B%22token%22%3A%22tok%22%7D">"#)
            .create_async()
            .await;
        let reviews = serde_json::json!({
            "data": [{
                "id": "7",
                "type": "user-reviews",
                "attributes": {
                    "date": "2024-03-04T23:00:00-07:00",
                    "userName": "bob",
                    "title": "Bad",
                    "review": "Crashes\non launch",
                    "rating": 1,
                    "developerResponse": {"id": 1, "body": "Fixed in 4.3", "modified": "2024-03-06T08:00:00Z"}
                }
            }]
        });
        let _reviews = server
            .mock("GET", "/v1/catalog/us/apps/284882215/reviews")
            .match_query(mockito::Matcher::UrlEncoded("offset".into(), "0".into()))
            .match_header("authorization", "bearer tok")
            .with_status(200)
            .with_body(reviews.to_string())
            .create_async()
            .await;

        let mut config = Config::default();
        config.cache.enabled = false;
        config.app_store.base_url = server.url();
        config.app_store.web_base_url = server.url();
        config.app_store.reviews_base_url = server.url();
        let fetcher = ReviewFetcher::from_config(&config);

        let export = scrape(&fetcher, "https://apps.apple.com/us/app/facebook/id284882215")
            .await
            .unwrap();
        assert_eq!(export.filename, "appstore_facebook_reviews.csv");
        assert_eq!(
            String::from_utf8(export.content).unwrap(),
            "Datetime,Username,Review,Rating,Reply,Reply Datetime,Thumbs Up\n04/03/2024,bob,Bad Crashes on launch,1,Fixed in 4.3,06/03/2024,\n"
        );
    }
}
