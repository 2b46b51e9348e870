use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Review as returned by a store, before normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RawReview {
    GooglePlay(PlayReview),
    AppStore(AppStoreReview),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayReview {
    pub review_id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>, // Play reviews normally have none
    pub content: String,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbs_up_count: Option<u64>,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replied_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppStoreReview {
    pub id: String,
    pub user_name: String,
    pub title: String,
    pub review: String,
    /// Rating as the store sent it, validated during normalization
    pub rating: String,
    pub date: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_response: Option<DeveloperResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeveloperResponse {
    pub body: String,
    pub modified: DateTime<FixedOffset>,
}
