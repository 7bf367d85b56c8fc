/// Normalizes a user- or server-supplied tag to its bare form: surrounding
/// whitespace trimmed and one leading `#` removed.
pub fn normalize_hashtag(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('#')
        .unwrap_or(trimmed)
        .trim_start()
        .to_string()
}

/// Normalizes a list of tags, dropping blanks and duplicates while keeping
/// first-seen order.
pub fn normalize_hashtags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = normalize_hashtag(tag.as_ref());
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }
    tags
}

/// Splits a comma-joined tag string, as some endpoints return it.
pub fn split_hashtags(joined: &str) -> Vec<String> {
    normalize_hashtags(joined.split(','))
}
