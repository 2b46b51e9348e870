use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use revscrap_models::Store;
use serde_json::{json, Value};
use tracing::{debug, warn};
use crate::error::FetchError;
use crate::http::status_error;
use crate::raw::PlayReview;

// RPC behind the "See all reviews" dialog on the Play Store web UI
const REVIEWS_RPC_ID: &str = "UsvDTd";
const SORT_NEWEST: u8 = 2;

// Anti-XSSI guard Google puts in front of batchexecute responses
const XSSI_PREFIX: &str = ")]}'";

/// One batch of reviews plus the token needed to request the next one
#[derive(Debug, Default)]
pub struct ReviewPage {
    pub reviews: Vec<PlayReview>,
    pub continuation_token: Option<String>,
}

/// Check the app's details page; 404 means the package does not exist
pub async fn check_app_exists(
    client: &Client,
    base_url: &str,
    app_id: &str,
    lang: &str,
    country: &str,
) -> Result<(), FetchError> {
    let response = client
        .get(format!("{}/store/apps/details", base_url))
        .query(&[("id", app_id), ("hl", lang), ("gl", country)])
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::GooglePlay, &e))?;

    if !response.status().is_success() {
        return Err(status_error(Store::GooglePlay, app_id, response.status(), "App details page"));
    }

    Ok(())
}

/// Build the `f.req` form value for one review batch
pub fn reviews_request_body(app_id: &str, count: u32, continuation_token: Option<&str>) -> String {
    let inner = json!([
        null,
        null,
        [2, SORT_NEWEST, [count, null, continuation_token], null, [null, null]],
        [app_id, 7]
    ]);
    json!([[[REVIEWS_RPC_ID, inner.to_string(), null, "generic"]]]).to_string()
}

/// Fetch one batch of reviews, newest first
pub async fn fetch_review_page(
    client: &Client,
    base_url: &str,
    app_id: &str,
    lang: &str,
    country: &str,
    count: u32,
    continuation_token: Option<&str>,
) -> Result<ReviewPage, FetchError> {
    let body = reviews_request_body(app_id, count, continuation_token);

    let response = client
        .post(format!("{}/_/PlayStoreUi/data/batchexecute", base_url))
        .query(&[("hl", lang), ("gl", country)])
        .form(&[("f.req", body.as_str())])
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::GooglePlay, &e))?;

    if !response.status().is_success() {
        return Err(status_error(Store::GooglePlay, app_id, response.status(), "Review batch request"));
    }

    let text = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::GooglePlay, &e))?;

    parse_review_page(&text).map_err(|message| FetchError::transient(Store::GooglePlay, message))
}

/// Parse a batchexecute response body into reviews and the continuation token.
///
/// The payload is JSON-in-JSON: the envelope's `[0][2]` is a string holding the
/// actual data, where `[0]` lists reviews and `[-2][-1]` is the next-page token.
/// A null payload means the store has nothing (more) to return.
pub fn parse_review_page(body: &str) -> Result<ReviewPage, String> {
    let trimmed = body.trim_start();
    let payload = trimmed.strip_prefix(XSSI_PREFIX).unwrap_or(trimmed);

    let envelope: Value = serde_json::from_str(payload.trim())
        .map_err(|e| format!("Failed to parse review response envelope: {}", e))?;

    let data = match envelope.pointer("/0/2").and_then(Value::as_str) {
        Some(data) => data,
        None => {
            debug!("Review response carried no payload");
            return Ok(ReviewPage::default());
        }
    };

    let data: Value = serde_json::from_str(data)
        .map_err(|e| format!("Failed to parse review payload: {}", e))?;

    let reviews: Vec<PlayReview> = data
        .get(0)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_review).collect())
        .unwrap_or_default();

    let continuation_token = data
        .as_array()
        .and_then(|parts| parts.len().checked_sub(2).and_then(|i| parts.get(i)))
        .and_then(Value::as_array)
        .and_then(|part| part.last())
        .and_then(Value::as_str)
        .map(String::from);

    Ok(ReviewPage {
        reviews,
        continuation_token,
    })
}

fn parse_review(item: &Value) -> Option<PlayReview> {
    let review_id = item.pointer("/0").and_then(Value::as_str)?.to_string();

    let score = match item.pointer("/2").and_then(Value::as_i64) {
        Some(score) => score,
        None => {
            warn!(review_id = %review_id, "Skipping review without a score");
            return None;
        }
    };
    let at = match item.pointer("/5/0").and_then(Value::as_i64).and_then(timestamp) {
        Some(at) => at,
        None => {
            warn!(review_id = %review_id, "Skipping review without a timestamp");
            return None;
        }
    };

    Some(PlayReview {
        review_id,
        user_name: string_at(item, "/1/0").unwrap_or_default(),
        title: None,
        content: string_at(item, "/4").unwrap_or_default(),
        score,
        thumbs_up_count: item.pointer("/6").and_then(Value::as_u64),
        at,
        reply_content: string_at(item, "/7/1"),
        replied_at: item.pointer("/7/2/0").and_then(Value::as_i64).and_then(timestamp),
        app_version: string_at(item, "/10"),
    })
}

fn string_at(item: &Value, pointer: &str) -> Option<String> {
    item.pointer(pointer).and_then(Value::as_str).map(String::from)
}

fn timestamp(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a batchexecute body the way the Play Store serves it
    pub(crate) fn batch_response(reviews: Value, token: Option<&str>) -> String {
        let data = json!([reviews, [null, token], null]);
        let envelope = json!([["wrb.fr", REVIEWS_RPC_ID, data.to_string(), null, null, null, "generic"]]);
        format!("{}\n\n{}", XSSI_PREFIX, envelope)
    }

    pub(crate) fn review_item(id: &str, user: &str, content: &str, score: i64, at: i64) -> Value {
        json!([id, [user, [null, 2, null, [null, null, "https://img"]]], score, null, content, [at, 0], 3, null, null, null, "1.2.3"])
    }

    #[test]
    fn test_request_body_first_page() {
        let body = reviews_request_body("com.example.app", 150, None);
        let outer: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(outer[0][0][0], "UsvDTd");
        assert_eq!(outer[0][0][3], "generic");

        let inner: Value = serde_json::from_str(outer[0][0][1].as_str().unwrap()).unwrap();
        assert_eq!(inner[2][1], 2);
        assert_eq!(inner[2][2], json!([150, null, null]));
        assert_eq!(inner[3], json!(["com.example.app", 7]));
    }

    #[test]
    fn test_request_body_with_token() {
        let body = reviews_request_body("com.example.app", 50, Some("tok\"en"));
        let outer: Value = serde_json::from_str(&body).unwrap();
        let inner: Value = serde_json::from_str(outer[0][0][1].as_str().unwrap()).unwrap();
        assert_eq!(inner[2][2], json!([50, null, "tok\"en"]));
    }

    #[test]
    fn test_parse_review_page() {
        let mut item = review_item("gp:1", "alice", "Great app", 5, 1_709_596_800);
        item[7] = json!([null, "Thanks alice", [1_709_683_200, 0]]);
        let body = batch_response(json!([item, review_item("gp:2", "bob", "Meh", 2, 1_709_510_400)]), Some("next"));

        let page = parse_review_page(&body).unwrap();
        assert_eq!(page.continuation_token.as_deref(), Some("next"));
        assert_eq!(page.reviews.len(), 2);

        let first = &page.reviews[0];
        assert_eq!(first.review_id, "gp:1");
        assert_eq!(first.user_name, "alice");
        assert_eq!(first.content, "Great app");
        assert_eq!(first.score, 5);
        assert_eq!(first.thumbs_up_count, Some(3));
        assert_eq!(first.at.to_rfc3339(), "2024-03-05T00:00:00+00:00");
        assert_eq!(first.reply_content.as_deref(), Some("Thanks alice"));
        assert_eq!(first.replied_at.map(|d| d.to_rfc3339()).as_deref(), Some("2024-03-06T00:00:00+00:00"));
        assert_eq!(first.app_version.as_deref(), Some("1.2.3"));
        assert_eq!(page.reviews[1].reply_content, None);
    }

    #[test]
    fn test_parse_null_payload_is_empty() {
        let body = format!("{}\n\n{}", XSSI_PREFIX, json!([["wrb.fr", REVIEWS_RPC_ID, null, null, null, null, "generic"]]));
        let page = parse_review_page(&body).unwrap();
        assert!(page.reviews.is_empty());
        assert!(page.continuation_token.is_none());
    }

    #[test]
    fn test_parse_skips_items_without_score() {
        let mut broken = review_item("gp:3", "carol", "No score", 4, 1_709_596_800);
        broken[2] = Value::Null;
        let body = batch_response(json!([broken]), None);
        let page = parse_review_page(&body).unwrap();
        assert!(page.reviews.is_empty());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_review_page("<html>captcha</html>").is_err());
    }
}
