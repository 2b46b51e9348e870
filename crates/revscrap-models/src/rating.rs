use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Star rating shared by both stores (1-5 integer)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating {0} is outside 1-5")]
    OutOfRange(i64),
    #[error("rating '{0}' is not an integer")]
    NotANumber(String),
}

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, RatingError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }

    /// Parse a rating delivered as text, e.g. `"5"`
    pub fn parse(raw: &str) -> Result<Self, RatingError> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| RatingError::NotANumber(raw.to_string()))?;
        Self::new(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
