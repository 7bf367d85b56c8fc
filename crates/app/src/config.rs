use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

const DEFAULT_API_BASE_URL: &str = "http://ioarchive.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub export_page_delay: Duration,
    /// 0 leaves exports unbounded.
    pub export_max_pages: u32,
    pub insights_interval: String,
    pub export_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let read_u64 = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            let raw = read(key, &default.to_string());
            raw.parse().map_err(|_| ConfigError::InvalidNumber(key, raw))
        };

        let api_base_url = read("IOA_API_BASE_URL", DEFAULT_API_BASE_URL);
        let request_timeout_secs = read_u64("IOA_REQUEST_TIMEOUT_SECS", 15)?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "IOA_REQUEST_TIMEOUT_SECS",
                request_timeout_secs.to_string(),
            ));
        }
        let export_page_delay_ms = read_u64("IOA_EXPORT_PAGE_DELAY_MS", 100)?;
        let export_max_pages = read_u64("IOA_EXPORT_MAX_PAGES", 0)?;
        let export_max_pages = u32::try_from(export_max_pages).map_err(|_| {
            ConfigError::InvalidNumber("IOA_EXPORT_MAX_PAGES", export_max_pages.to_string())
        })?;
        let insights_interval = read("IOA_INSIGHTS_INTERVAL", "day");
        if !matches!(insights_interval.as_str(), "hour" | "day" | "week" | "month") {
            return Err(ConfigError::InvalidValue(
                "IOA_INSIGHTS_INTERVAL",
                insights_interval,
            ));
        }
        let export_dir = PathBuf::from(read("IOA_EXPORT_DIR", "."));

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            export_page_delay: Duration::from_millis(export_page_delay_ms),
            export_max_pages,
            insights_interval,
            export_dir,
        })
    }
}

/// Loads `.env` from the working directory. Variables already set in the
/// environment win.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in contents.lines().filter_map(dotenv_entry) {
        if std::env::var_os(&key).is_none() {
            // Safety: called from main on the current-thread runtime before any
            // request spawns a blocking task.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn dotenv_entry(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        unescape_double_quoted(inner)
    } else if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
        inner.to_string()
    } else {
        value.to_string()
    };
    Some((key.to_string(), value))
}

/// Backslash escapes are decoded in double-quoted values only.
fn unescape_double_quoted(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('r') => output.push('\r'),
            Some('t') => output.push('\t'),
            Some('\\') => output.push('\\'),
            Some('"') => output.push('"'),
            Some(other) => {
                output.push('\\');
                output.push(other);
            }
            None => output.push('\\'),
        }
    }
    output
}
