use reqwest::{Client, StatusCode};
use revscrap_models::Store;
use std::time::Duration;
use crate::error::FetchError;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Per-request ceiling; the whole fetch is bounded separately by the caller
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a reqwest Client with browser-like headers; both stores reject bare clients
pub fn create_http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Map a non-success HTTP status onto the two fetch failure kinds
pub fn status_error(store: Store, app_id: &str, status: StatusCode, context: &str) -> FetchError {
    if status == StatusCode::NOT_FOUND {
        FetchError::not_found(store, app_id)
    } else {
        FetchError::transient(store, format!("{} returned {}", context, status))
    }
}
