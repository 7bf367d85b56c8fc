use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::hashtag::{normalize_hashtags, split_hashtags};

/// One post from the dataset as returned by the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    #[serde(default, deserialize_with = "lenient_string")]
    pub tweetid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub userid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_screen_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_display_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_profile_description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_profile_url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_reported_location: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub follower_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub following_count: u64,
    #[serde(default)]
    pub account_creation_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_language: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tweet_language: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tweet_text: String,
    #[serde(default)]
    pub tweet_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tweet_client_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub in_reply_to_tweetid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub in_reply_to_userid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quoted_tweet_tweetid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub is_retweet: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub retweet_userid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub retweet_tweetid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub latitude: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub longitude: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub quote_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reply_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub retweet_count: u64,
    #[serde(default, deserialize_with = "hashtag_list")]
    pub hashtags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub urls: String,
    #[serde(default, deserialize_with = "string_list")]
    pub user_mentions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dataset: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_name: String,
    /// Fields the server sent that the record does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tweet {
    pub fn display_name(&self) -> &str {
        if self.user_display_name.trim().is_empty() {
            &self.user_screen_name
        } else {
            &self.user_display_name
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrJoined {
    List(Vec<String>),
    Joined(String),
}

fn hashtag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<ListOrJoined> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(ListOrJoined::List(items)) => normalize_hashtags(items),
        Some(ListOrJoined::Joined(joined)) => split_hashtags(&joined),
        None => Vec::new(),
    })
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<ListOrJoined> = Option::deserialize(deserializer)?;
    let items = match raw {
        Some(ListOrJoined::List(items)) => items,
        Some(ListOrJoined::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(value) => value,
        other => other.to_string(),
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(count_from(&Value::deserialize(deserializer)?))
}

/// Whole non-negative numbers only; everything else counts as 0.
fn count_from(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| count_from_float(number.as_f64()?))
            .unwrap_or(0),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| count_from_float(text.parse::<f64>().ok()?))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn count_from_float(float: f64) -> Option<u64> {
    (float.is_finite() && float >= 0.0 && float.fract() == 0.0).then_some(float as u64)
}
