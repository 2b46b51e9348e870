//! Router setup for the web interface.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use revscrap_config::Config;
use revscrap_core::ReviewFetcher;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{download_handler, health_handler, index_handler};

/// Shared by every request. The fetcher holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<ReviewFetcher>,
}

impl AppState {
    pub fn new(fetcher: ReviewFetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ReviewFetcher::from_config(config))
    }
}

pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/download", post(download_handler))
        .route("/health", get(health_handler))
        // Layers run last-added first
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
