use revscrap_sources::FetchError;
use serde::Serialize;
use thiserror::Error;
use crate::export::ExportError;

/// User-facing failure categories. None of them are fatal; the user can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    AppNotFound,
    FetchTransient,
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => {
                "Not a recognized store URL. Make sure to use a Google Play or App Store app link."
            }
            ErrorKind::AppNotFound => "App not found on the store. Check the link and try again.",
            ErrorKind::FetchTransient => {
                "Could not fetch reviews from the store right now. Please try again in a moment."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("'{0}' is not a recognized store URL")]
    InvalidUrl(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            ScrapeError::Fetch(FetchError::NotFound { .. }) => ErrorKind::AppNotFound,
            ScrapeError::Fetch(FetchError::Transient { .. }) => ErrorKind::FetchTransient,
            // Retrying is the only remedy here as well
            ScrapeError::Export(_) => ErrorKind::FetchTransient,
        }
    }
}
