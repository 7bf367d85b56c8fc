use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::date_range::DATE_FORMAT;
use crate::types::hashtag::normalize_hashtag;

/// A ranked `(key, count)` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    pub doc_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Bucket start as epoch milliseconds.
    #[serde(default)]
    pub key: i64,
    #[serde(default)]
    pub key_as_string: String,
    pub doc_count: u64,
}

/// Server-computed aggregates for a criteria. Replaced wholesale on fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub top_hashtags: Vec<Bucket>,
    #[serde(default)]
    pub top_users: Vec<Bucket>,
    #[serde(default)]
    pub top_urls: Vec<Bucket>,
    #[serde(default)]
    pub tweets_over_time: Vec<TimeBucket>,
}

impl Insights {
    pub fn is_empty(&self) -> bool {
        self.top_hashtags.is_empty()
            && self.top_users.is_empty()
            && self.top_urls.is_empty()
            && self.tweets_over_time.is_empty()
    }

    /// Re-buckets the time series into Sunday-started weeks, labelled with
    /// the week start date and sorted ascending.
    pub fn weekly_buckets(&self) -> Vec<Bucket> {
        let mut weeks: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for bucket in &self.tweets_over_time {
            let Some(day) = bucket_date(bucket) else {
                continue;
            };
            let offset = u64::from(day.weekday().num_days_from_sunday());
            let Some(week_start) = day.checked_sub_days(Days::new(offset)) else {
                continue;
            };
            *weeks.entry(week_start).or_default() += bucket.doc_count;
        }
        weeks
            .into_iter()
            .map(|(week_start, doc_count)| Bucket {
                key: week_start.format(DATE_FORMAT).to_string(),
                doc_count,
            })
            .collect()
    }

    /// URL ranking without the empty-key bucket the server emits for posts
    /// that carry no link.
    pub fn chartable_urls(&self) -> Vec<Bucket> {
        self.top_urls
            .iter()
            .filter(|bucket| !bucket.key.trim().is_empty())
            .cloned()
            .collect()
    }

    /// Bare hashtag keys for autocomplete, in ranking order.
    pub fn suggestions(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::with_capacity(self.top_hashtags.len());
        for bucket in &self.top_hashtags {
            let tag = normalize_hashtag(&bucket.key);
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

fn bucket_date(bucket: &TimeBucket) -> Option<NaiveDate> {
    let label = bucket.key_as_string.trim();
    if !label.is_empty() {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(label) {
            return Some(parsed.date_naive());
        }
        let day = label.get(..10).unwrap_or(label);
        if let Ok(parsed) = NaiveDate::parse_from_str(day, DATE_FORMAT) {
            return Some(parsed);
        }
    }
    if bucket.key == 0 {
        return None;
    }
    DateTime::from_timestamp_millis(bucket.key).map(|dt| dt.date_naive())
}
