use chrono::NaiveDate;
use serde::Serialize;
use crate::rating::Rating;

/// One user review, normalized across stores.
///
/// Records are built once per raw store item and never mutated afterwards.
/// A reply date is only kept when there is reply text to go with it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReviewRecord {
    datetime: NaiveDate,
    username: String,
    review_text: String,
    rating: Rating,
    reply_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_datetime: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbs_up: Option<u64>, // Google Play only
}

impl ReviewRecord {
    pub fn new(
        datetime: NaiveDate,
        username: impl Into<String>,
        review_text: impl Into<String>,
        rating: Rating,
    ) -> Self {
        Self {
            datetime,
            username: username.into(),
            review_text: review_text.into(),
            rating,
            reply_text: String::new(),
            reply_datetime: None,
            thumbs_up: None,
        }
    }

    pub fn with_reply(mut self, reply_text: impl Into<String>, reply_datetime: Option<NaiveDate>) -> Self {
        self.reply_text = reply_text.into();
        self.reply_datetime = if self.reply_text.is_empty() {
            None
        } else {
            reply_datetime
        };
        self
    }

    pub fn with_thumbs_up(mut self, thumbs_up: Option<u64>) -> Self {
        self.thumbs_up = thumbs_up;
        self
    }

    pub fn datetime(&self) -> NaiveDate {
        self.datetime
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn review_text(&self) -> &str {
        &self.review_text
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn reply_text(&self) -> &str {
        &self.reply_text
    }

    pub fn reply_datetime(&self) -> Option<NaiveDate> {
        self.reply_datetime
    }

    pub fn thumbs_up(&self) -> Option<u64> {
        self.thumbs_up
    }
}
