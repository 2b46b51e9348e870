use chrono::DateTime;
use reqwest::{header, Client};
use revscrap_models::Store;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use crate::error::FetchError;
use crate::http::status_error;
use crate::raw::{AppStoreReview, DeveloperResponse};

/// URL-encoded `token":"` inside the app page's environment meta tag
const TOKEN_MARKER: &str = "token%22%3A%22";
const TOKEN_END: &str = "%22";

const ADDITIONAL_PLATFORMS: &str = "appletv,ipad,iphone,mac";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(rename = "resultCount")]
    result_count: u32,
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    #[serde(rename = "trackName")]
    track_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    #[serde(default)]
    data: Vec<Value>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewData {
    id: Value,
    attributes: ReviewAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewAttributes {
    date: String,
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    review: String,
    rating: Option<Value>,
    developer_response: Option<DeveloperResponseAttributes>,
}

#[derive(Debug, Deserialize)]
struct DeveloperResponseAttributes {
    #[serde(default)]
    body: String,
    modified: String,
}

/// One page of reviews plus the offset of the next one, if the store announced it
#[derive(Debug, Default)]
pub struct ReviewPage {
    pub reviews: Vec<AppStoreReview>,
    pub next_offset: Option<u32>,
}

/// Everything a reviews request needs apart from the offset
#[derive(Debug, Clone, Copy)]
pub struct ReviewQuery<'a> {
    pub base_url: &'a str,
    pub app_id: &'a str,
    pub country: &'a str,
    pub lang: &'a str,
    pub token: &'a str,
    pub limit: u32,
}

/// Look the app up by numeric id; returns the store's display name
pub async fn lookup_app(
    client: &Client,
    base_url: &str,
    app_id: &str,
    country: &str,
) -> Result<Option<String>, FetchError> {
    let response = client
        .get(format!("{}/lookup", base_url))
        .query(&[("id", app_id), ("country", country)])
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::AppStore, &e))?;

    if !response.status().is_success() {
        return Err(status_error(Store::AppStore, app_id, response.status(), "App lookup"));
    }

    let lookup: LookupResponse = response
        .json()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::AppStore, &e))?;

    if lookup.result_count == 0 {
        return Err(FetchError::not_found(Store::AppStore, app_id));
    }

    Ok(lookup.results.into_iter().next().and_then(|r| r.track_name))
}

pub fn app_page_url(web_base_url: &str, country: &str, app_id: &str, slug: Option<&str>) -> String {
    match slug {
        Some(slug) => format!(
            "{}/{}/app/{}/id{}",
            web_base_url,
            urlencoding::encode(country),
            urlencoding::encode(slug),
            urlencoding::encode(app_id)
        ),
        None => format!(
            "{}/{}/app/id{}",
            web_base_url,
            urlencoding::encode(country),
            urlencoding::encode(app_id)
        ),
    }
}

/// Load the public app page and pull out the bearer token the reviews API expects
pub async fn fetch_token(client: &Client, page_url: &str, app_id: &str) -> Result<String, FetchError> {
    let response = client
        .get(page_url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::AppStore, &e))?;

    if !response.status().is_success() {
        return Err(status_error(Store::AppStore, app_id, response.status(), "App page"));
    }

    let html = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::AppStore, &e))?;

    extract_token(&html).ok_or_else(|| FetchError::transient(Store::AppStore, "App page carried no API token"))
}

pub fn extract_token(html: &str) -> Option<String> {
    let start = html.find(TOKEN_MARKER)? + TOKEN_MARKER.len();
    let rest = &html[start..];
    let end = rest.find(TOKEN_END)?;
    let token = &rest[..end];
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Fetch the reviews starting at `offset`
pub async fn fetch_review_page(client: &Client, query: &ReviewQuery<'_>, offset: u32) -> Result<ReviewPage, FetchError> {
    let url = format!(
        "{}/v1/catalog/{}/apps/{}/reviews",
        query.base_url,
        urlencoding::encode(query.country),
        urlencoding::encode(query.app_id)
    );

    let response = client
        .get(&url)
        .header(header::AUTHORIZATION, format!("bearer {}", query.token))
        .query(&[
            ("l", query.lang.to_string()),
            ("offset", offset.to_string()),
            ("limit", query.limit.to_string()),
            ("platform", "web".to_string()),
            ("additionalPlatforms", ADDITIONAL_PLATFORMS.to_string()),
        ])
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::AppStore, &e))?;

    // The end of the reviews is signalled by a missing `next` link, never by a status
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(Store::AppStore, query.app_id, status, "Reviews API"));
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(Store::AppStore, &e))?;

    parse_review_page(&body).map_err(|message| FetchError::transient(Store::AppStore, message))
}

/// Parse one reviews API response. Malformed items are skipped, not fatal.
pub fn parse_review_page(body: &str) -> Result<ReviewPage, String> {
    let response: ReviewsResponse = serde_json::from_str(body)
        .map_err(|e| format!("Failed to parse reviews response: {}", e))?;

    let mut reviews = Vec::with_capacity(response.data.len());
    for item in response.data {
        let data: ReviewData = match serde_json::from_value(item) {
            Ok(data) => data,
            Err(e) => {
                warn!("Skipping malformed App Store review: {}", e);
                continue;
            }
        };
        if let Some(review) = convert_review(data) {
            reviews.push(review);
        }
    }

    let next_offset = response.next.as_deref().and_then(next_offset);
    debug!(received = reviews.len(), next_offset = ?next_offset, "Parsed App Store review page");

    Ok(ReviewPage { reviews, next_offset })
}

fn convert_review(data: ReviewData) -> Option<AppStoreReview> {
    let id = match data.id {
        Value::String(id) => id,
        other => other.to_string(),
    };
    let attributes = data.attributes;

    let date = match DateTime::parse_from_rfc3339(&attributes.date) {
        Ok(date) => date,
        Err(e) => {
            warn!(review_id = %id, "Skipping review with unparsable date '{}': {}", attributes.date, e);
            return None;
        }
    };

    // Validated during normalization
    let rating = match attributes.rating {
        Some(Value::String(rating)) => rating,
        Some(Value::Number(rating)) => rating.to_string(),
        _ => {
            warn!(review_id = %id, "Skipping review without a rating");
            return None;
        }
    };

    let developer_response = attributes.developer_response.and_then(|response| {
        match DateTime::parse_from_rfc3339(&response.modified) {
            Ok(modified) => Some(DeveloperResponse {
                body: response.body,
                modified,
            }),
            Err(e) => {
                warn!(review_id = %id, "Dropping developer response with unparsable date '{}': {}", response.modified, e);
                None
            }
        }
    });

    Some(AppStoreReview {
        id,
        user_name: attributes.user_name,
        title: attributes.title,
        review: attributes.review,
        rating,
        date,
        developer_response,
    })
}

/// Offset query parameter of a `next` link such as `/v1/catalog/us/apps/1/reviews?offset=20`
fn next_offset(next: &str) -> Option<u32> {
    let (_, query) = next.split_once('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("offset="))
        .and_then(|offset| offset.parse().ok())
}
