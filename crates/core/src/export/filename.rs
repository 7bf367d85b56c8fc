use chrono::NaiveDate;

use crate::types::date_range::DATE_FORMAT;

const QUERY_PART_LIMIT: usize = 30;

/// `tweets_export[_<query>]_<date>.csv`, with the query reduced to
/// `[A-Za-z0-9_]` and cut to thirty characters.
pub fn export_filename(query: &str, date: NaiveDate) -> String {
    let query_part: String = query
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .take(QUERY_PART_LIMIT)
        .collect();
    let date = date.format(DATE_FORMAT);
    if query_part.is_empty() {
        format!("tweets_export_{date}.csv")
    } else {
        format!("tweets_export_{query_part}_{date}.csv")
    }
}
