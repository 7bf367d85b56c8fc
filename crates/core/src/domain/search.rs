use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::tweet::Tweet;
use crate::error::CoreError;
use crate::types::date_range::DateRange;
use crate::types::hashtag::{normalize_hashtag, normalize_hashtags};
use crate::types::sort::SortOrder;

pub const PAGE_SIZE: u32 = 10;

/// Staged query text and filters. A submission replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub query: String,
    /// `None` means all languages.
    pub language: Option<String>,
    pub date_range: DateRange,
    pub sort: SortOrder,
    hashtags: Vec<String>,
}

/// A single staged filter edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaField {
    Language(Option<String>),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
    DateRange(DateRange),
    Sort(SortOrder),
    AddHashtag(String),
    RemoveHashtag(String),
    Hashtags(Vec<String>),
}

impl SearchCriteria {
    pub fn with_query(mut self, raw: &str) -> Self {
        self.query = raw.trim().to_string();
        self
    }

    pub fn hashtags(&self) -> &[String] {
        &self.hashtags
    }

    pub fn set_hashtags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hashtags = normalize_hashtags(tags);
    }

    /// Language value as encoded on the wire; empty selects all.
    pub fn language_param(&self) -> &str {
        match self.language.as_deref() {
            Some("all") | None => "",
            Some(code) => code,
        }
    }

    /// Applies one filter edit. Edits that would invert the date range are
    /// rejected and leave the criteria untouched.
    pub fn apply(&mut self, field: CriteriaField) -> Result<(), CoreError> {
        match field {
            CriteriaField::Language(language) => {
                self.language = language
                    .map(|code| code.trim().to_string())
                    .filter(|code| !code.is_empty() && code != "all");
            }
            CriteriaField::StartDate(start) => {
                self.date_range = self.date_range.with_start(start)?;
            }
            CriteriaField::EndDate(end) => {
                self.date_range = self.date_range.with_end(end)?;
            }
            CriteriaField::DateRange(range) => self.date_range = range,
            CriteriaField::Sort(sort) => self.sort = sort,
            CriteriaField::AddHashtag(tag) => {
                let tag = normalize_hashtag(&tag);
                if !tag.is_empty() && !self.hashtags.contains(&tag) {
                    self.hashtags.push(tag);
                }
            }
            CriteriaField::RemoveHashtag(tag) => {
                let tag = normalize_hashtag(&tag);
                self.hashtags.retain(|existing| *existing != tag);
            }
            CriteriaField::Hashtags(tags) => self.set_hashtags(tags),
        }
        Ok(())
    }
}

/// The (page, size) pair that selects a slice of matching records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub size: u32,
}

impl PageWindow {
    pub fn new(page: u32) -> Self {
        Self {
            page: page.max(1),
            size: PAGE_SIZE,
        }
    }

    pub fn total_pages(total: u64) -> u32 {
        let pages = total.div_ceil(u64::from(PAGE_SIZE));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn contains(page: u32, total: u64) -> bool {
        page >= 1 && page <= Self::total_pages(total)
    }

    /// 1-based bounds of the records shown on this page, or `None` when the
    /// page is empty.
    pub fn display_range(&self, total: u64, shown: usize) -> Option<(u64, u64)> {
        if shown == 0 {
            return None;
        }
        let start = u64::from(self.page.saturating_sub(1)) * u64::from(self.size) + 1;
        let end = (u64::from(self.page) * u64::from(self.size)).min(total);
        Some((start, end.max(start)))
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Body of a `/search` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub tweets: Vec<Tweet>,
}
