use revscrap_models::Store;
use thiserror::Error;

/// Failure of one store fetch. Partial results are never returned alongside it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{store} app '{app_id}' was not found")]
    NotFound { store: Store, app_id: String },
    #[error("{store} request failed: {message}")]
    Transient { store: Store, message: String },
}

impl FetchError {
    pub fn not_found(store: Store, app_id: impl Into<String>) -> Self {
        Self::NotFound {
            store,
            app_id: app_id.into(),
        }
    }

    pub fn transient(store: Store, message: impl Into<String>) -> Self {
        Self::Transient {
            store,
            message: message.into(),
        }
    }

    pub fn from_reqwest(store: Store, error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("timed out: {}", error)
        } else if error.is_connect() {
            format!("could not connect: {}", error)
        } else if error.is_decode() {
            format!("unexpected response body: {}", error)
        } else {
            error.to_string()
        };
        Self::transient(store, message)
    }

    pub fn store(&self) -> Store {
        match self {
            FetchError::NotFound { store, .. } | FetchError::Transient { store, .. } => *store,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}
