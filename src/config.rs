use std::time::Duration;

use crate::error::AppError;
use crate::store::Store;

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Below this many characters (grapheme clusters) a quick search is not issued.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;

const KEY_PAGE_SIZE: &str = "feed.page_size";
const KEY_FETCH_TIMEOUT_MS: &str = "feed.fetch_timeout_ms";
const KEY_MIN_QUERY_CHARS: &str = "search.min_query_chars";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub page_size: usize,
    pub fetch_timeout: Duration,
    pub min_query_chars: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            page_size: DEFAULT_PAGE_SIZE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }
}

impl FeedConfig {
    /// Defaults, overridden by whatever is stored in `app_settings`.
    pub fn load(store: &Store) -> Result<Self, AppError> {
        let mut config = FeedConfig::default();

        if let Some(v) = store.get_setting(KEY_PAGE_SIZE)? {
            config.page_size = parse_positive(KEY_PAGE_SIZE, &v)?;
        }
        if let Some(v) = store.get_setting(KEY_FETCH_TIMEOUT_MS)? {
            config.fetch_timeout = Duration::from_millis(parse_positive(KEY_FETCH_TIMEOUT_MS, &v)? as u64);
        }
        if let Some(v) = store.get_setting(KEY_MIN_QUERY_CHARS)? {
            config.min_query_chars = v.trim().parse().map_err(|_| {
                AppError::Config(format!("{} must be a number, got '{}'", KEY_MIN_QUERY_CHARS, v))
            })?;
        }

        log::debug!("feed config: {:?}", config);
        Ok(config)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize, AppError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))),
    }
}
