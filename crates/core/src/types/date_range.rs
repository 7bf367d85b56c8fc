use chrono::NaiveDate;

use crate::error::CoreError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar-date filter. Either end may be open while the user is still
/// picking; the wire encoding only carries a range with both ends set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, CoreError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(CoreError::InvalidDateRange(format!(
                    "{}~{}",
                    start.format(DATE_FORMAT),
                    end.format(DATE_FORMAT)
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Parses `start~end`, where either side may be blank.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        let Some((left, right)) = trimmed.split_once('~') else {
            return Err(CoreError::InvalidDateRange(trimmed.to_string()));
        };
        let start = parse_optional_date(left)?;
        let end = parse_optional_date(right)?;
        Self::new(start, end).map_err(|_| CoreError::InvalidDateRange(trimmed.to_string()))
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn with_start(self, start: Option<NaiveDate>) -> Result<Self, CoreError> {
        Self::new(start, self.end)
    }

    pub fn with_end(self, end: Option<NaiveDate>) -> Result<Self, CoreError> {
        Self::new(self.start, end)
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// `(from, to)` as sent to the API. A one-sided range yields `None`:
    /// the server has no half-open form, so the filter is dropped.
    pub fn query_bounds(&self) -> Option<(String, String)> {
        let (start, end) = (self.start?, self.end?);
        Some((
            start.format(DATE_FORMAT).to_string(),
            end.format(DATE_FORMAT).to_string(),
        ))
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(input.trim().to_string()))
}

fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed).map(Some)
}
