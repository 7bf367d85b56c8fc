use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Sort key passed through to the search endpoint. `Default` leaves the
/// ordering to the server and is encoded as an empty value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Default,
    Accuracy,
    Time,
    Retweets,
    Likes,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Default => "",
            SortOrder::Accuracy => "accuracy",
            SortOrder::Time => "time",
            SortOrder::Retweets => "retweets",
            SortOrder::Likes => "likes",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "default" | "none" => Ok(SortOrder::Default),
            "accuracy" => Ok(SortOrder::Accuracy),
            "time" => Ok(SortOrder::Time),
            "retweets" => Ok(SortOrder::Retweets),
            "likes" => Ok(SortOrder::Likes),
            other => Err(CoreError::InvalidSort(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Default => f.write_str("default"),
            other => f.write_str(other.as_param()),
        }
    }
}
