use serde::{Deserialize, Serialize};
use std::fmt;

/// App marketplace a review came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    GooglePlay,
    AppStore,
}

impl Store {
    pub fn as_str(&self) -> &'static str {
        match self {
            Store::GooglePlay => "google_play",
            Store::AppStore => "app_store",
        }
    }

    /// Prefix used for suggested download filenames
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Store::GooglePlay => "playstore",
            Store::AppStore => "appstore",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Store::GooglePlay => "Google Play",
            Store::AppStore => "App Store",
        };
        write!(f, "{}", name)
    }
}

/// Identifies one app listing on a store, as extracted from its URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AppRef {
    /// Package name on Google Play, numeric id on the App Store
    pub app_id: String,
    /// Human-readable name segment of App Store URLs (e.g. "enel-x-way")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl AppRef {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            slug: None,
            country: None,
            lang: None,
        }
    }

    pub fn with_slug(mut self, slug: Option<String>) -> Self {
        self.slug = slug;
        self
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country;
        self
    }

    pub fn with_lang(mut self, lang: Option<String>) -> Self {
        self.lang = lang;
        self
    }
}

/// Result of classifying a submitted URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    GooglePlay(AppRef),
    AppStore(AppRef),
    Invalid,
}

impl StoreTarget {
    pub fn store(&self) -> Option<Store> {
        match self {
            StoreTarget::GooglePlay(_) => Some(Store::GooglePlay),
            StoreTarget::AppStore(_) => Some(Store::AppStore),
            StoreTarget::Invalid => None,
        }
    }

    pub fn app(&self) -> Option<&AppRef> {
        match self {
            StoreTarget::GooglePlay(app) | StoreTarget::AppStore(app) => Some(app),
            StoreTarget::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, StoreTarget::Invalid)
    }
}
