use std::fmt::Write;

use ioa_core::domain::insights::{Bucket, Insights};
use ioa_core::domain::search::PageWindow;
use ioa_core::domain::tweet::Tweet;
use ioa_core::format::{format_count, format_date, format_date_detailed, hashtag_chips};
use ioa_core::session::SearchState;

const CARD_TAG_LIMIT: usize = 3;
const BAR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 24;

pub fn results(state: &SearchState) -> String {
    let mut out = String::new();
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {error}");
        return out;
    }
    let query = &state.criteria.query;
    if !query.is_empty() {
        let window = PageWindow::new(state.page);
        let shown = match window.display_range(state.total, state.records.len()) {
            Some((start, end)) => format!("{start}-{end}"),
            None => "0".to_string(),
        };
        let _ = writeln!(out, "Search: {query}");
        let _ = writeln!(out, "Showing results {shown} out of {}", state.total);
        if state.records.is_empty() {
            let _ = writeln!(out, "No tweets found");
        }
    }
    for tweet in &state.records {
        out.push('\n');
        out.push_str(&card(tweet));
    }
    if state.total_pages() > 1 {
        let _ = writeln!(out, "\nPage {} of {}", state.page, state.total_pages());
    }
    out
}

pub fn card(tweet: &Tweet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "@{}'s Tweet  [{}]", tweet.user_screen_name, tweet.tweetid);
    let _ = writeln!(out, "  {}", tweet.tweet_text);
    let mut meta = format_date(tweet.tweet_time.as_deref());
    let chips = hashtag_chips(&tweet.hashtags, CARD_TAG_LIMIT);
    if !chips.is_empty() {
        meta.push_str("  ");
        meta.push_str(&chips.join(" "));
    }
    let _ = writeln!(out, "  {meta}");
    let _ = writeln!(
        out,
        "  likes {}  retweets {}  replies {}",
        format_count(tweet.like_count),
        format_count(tweet.retweet_count),
        format_count(tweet.reply_count)
    );
    out
}

pub fn details(tweet: &Tweet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", tweet.display_name());
    let _ = writeln!(out, "@{}", tweet.user_screen_name);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", tweet.tweet_text);
    let _ = writeln!(out, "{}", format_date_detailed(tweet.tweet_time.as_deref()));
    if !tweet.hashtags.is_empty() {
        let tags: Vec<String> = tweet.hashtags.iter().map(|tag| format!("#{tag}")).collect();
        let _ = writeln!(out, "Hashtags: {}", tags.join(" "));
    }
    let _ = writeln!(
        out,
        "Likes {}  Retweets {}  Replies {}  Quotes {}",
        tweet.like_count, tweet.retweet_count, tweet.reply_count, tweet.quote_count
    );
    let _ = writeln!(out);
    if !tweet.user_reported_location.trim().is_empty() {
        let _ = writeln!(out, "Location: {}", tweet.user_reported_location);
    }
    let _ = writeln!(
        out,
        "{} followers · {} following",
        tweet.follower_count, tweet.following_count
    );
    if !tweet.user_profile_description.trim().is_empty() {
        let _ = writeln!(out, "Bio: {}", tweet.user_profile_description);
    }
    let _ = writeln!(
        out,
        "Account created: {}",
        format_date(tweet.account_creation_date.as_deref())
    );
    out
}

pub fn insights(insights: &Insights) -> String {
    let mut out = String::new();
    out.push_str(&histogram("Tweets by week", &insights.weekly_buckets()));
    out.push_str(&histogram("Top hashtags", &insights.top_hashtags));
    out.push_str(&histogram("Top users", &insights.top_users));
    out.push_str(&histogram("Top URLs", &insights.chartable_urls()));
    out
}

pub fn histogram(title: &str, buckets: &[Bucket]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let max = buckets.iter().map(|bucket| bucket.doc_count).max().unwrap_or(0);
    if max == 0 {
        let _ = writeln!(out, "  (no data)");
        return out;
    }
    for bucket in buckets {
        let len = (bucket.doc_count as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
        let label = truncate(&bucket.key, LABEL_WIDTH);
        let _ = writeln!(
            out,
            "  {label:<LABEL_WIDTH$} {} {}",
            "#".repeat(len.max(1)),
            bucket.doc_count
        );
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
