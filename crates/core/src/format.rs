//! Display helpers for record fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MISSING: &str = "N/A";
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// `"Mar 15, 2025"`. Missing input renders as `N/A`; input that is not a
/// recognizable timestamp is returned as-is.
pub fn format_date(raw: Option<&str>) -> String {
    format_with(raw, "%b %-d, %Y")
}

/// `"March 15, 2025, 02:30 PM"`, with the same fallbacks as [`format_date`].
pub fn format_date_detailed(raw: Option<&str>) -> String {
    format_with(raw, "%B %-d, %Y, %I:%M %p")
}

/// Compact engagement count: `999`, `1.0K`, `2.5M`.
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Tag chips for a result card: the first `limit` tags plus a `+N` chip for
/// the rest.
pub fn hashtag_chips(tags: &[String], limit: usize) -> Vec<String> {
    let mut chips: Vec<String> = tags.iter().take(limit).map(|tag| format!("#{tag}")).collect();
    if tags.len() > limit {
        chips.push(format!("+{}", tags.len() - limit));
    }
    chips
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_local());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn format_with(raw: Option<&str>, pattern: &str) -> String {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return MISSING.to_string();
    };
    match parse_timestamp(raw) {
        Some(parsed) => parsed.format(pattern).to_string(),
        None => raw.to_string(),
    }
}
