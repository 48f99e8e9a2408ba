use crate::aggregate::predict::SourceWeights;
use anyhow::Context;
use std::str::FromStr;

const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PROVIDER_RETRIES: u32 = 3;

pub const DEFAULT_SUBREDDITS: &str =
    "wallstreetbets+stocks+investing+options+StockMarket+pennystocks+Superstonk+Trading";

pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &[
    "theater",
    "movie",
    "cinema",
    "amc 10",
    "amc 12",
    "satellite",
    "tv",
    "aops",
    "employee",
    "ape",
    "BBY",
    "Best Buy",
];

#[derive(Debug, Clone)]
pub struct Settings {
    pub provider_base_url: Option<String>,
    pub provider_timeout_secs: u64,
    pub provider_retries: u32,
    pub sentry_dsn: Option<String>,
    pub engine: EngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_base_url: None,
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            provider_retries: DEFAULT_PROVIDER_RETRIES,
            sentry_dsn: None,
            engine: EngineConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = EngineConfig::default();

        let engine = EngineConfig {
            result_ttl_secs: env_parse("RESULT_CACHE_TTL_SECS").unwrap_or(defaults.result_ttl_secs),
            analytics_ttl_secs: env_parse("ANALYTICS_CACHE_TTL_SECS")
                .unwrap_or(defaults.analytics_ttl_secs),
            source_timeout_secs: env_parse("SOURCE_TIMEOUT_SECS")
                .unwrap_or(defaults.source_timeout_secs),
            subreddits: std::env::var("SOCIAL_SUBREDDITS")
                .ok()
                .map(|s| split_list(&s, '+'))
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.subreddits.clone()),
            post_limit: env_parse("SOCIAL_POST_LIMIT").unwrap_or(defaults.post_limit),
            news_page_size: env_parse("NEWS_PAGE_SIZE").unwrap_or(defaults.news_page_size),
            exclude_keywords: std::env::var("EXCLUDE_KEYWORDS")
                .ok()
                .map(|s| split_list(&s, ','))
                .unwrap_or(defaults.exclude_keywords.clone()),
            top_posts: env_parse("TOP_POSTS").unwrap_or(defaults.top_posts),
            ..defaults
        };
        engine.validate().context("invalid engine configuration")?;

        Ok(Self {
            provider_base_url: std::env::var("PROVIDER_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            provider_timeout_secs: env_parse("PROVIDER_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
            provider_retries: env_parse("PROVIDER_RETRIES").unwrap_or(DEFAULT_PROVIDER_RETRIES),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            engine,
        })
    }

    pub fn require_provider_base_url(&self) -> anyhow::Result<&str> {
        self.provider_base_url
            .as_deref()
            .context("PROVIDER_BASE_URL is required")
    }
}

/// Engine policy: cache lifetimes, collaborator budgets, lookback windows and filters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub result_ttl_secs: i64,
    pub analytics_ttl_secs: i64,
    pub source_timeout_secs: u64,
    pub subreddits: Vec<String>,
    pub post_limit: usize,
    pub search_limit: usize,
    /// Below this many matching recent posts the profile's fallback search runs.
    pub fallback_min_posts: usize,
    pub news_page_size: usize,
    pub news_lookback_days: i64,
    pub trend_lookback_days: i64,
    pub analytics_lookback_days: i64,
    pub display_bars: usize,
    pub correlation_lookback_days: i64,
    pub correlation_period: usize,
    pub exclude_keywords: Vec<String>,
    pub top_posts: usize,
    pub preview_chars: usize,
    pub weights: SourceWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            result_ttl_secs: 300,
            analytics_ttl_secs: 600,
            source_timeout_secs: 10,
            subreddits: split_list(DEFAULT_SUBREDDITS, '+'),
            post_limit: 500,
            search_limit: 100,
            fallback_min_posts: 3,
            news_page_size: 20,
            news_lookback_days: 7,
            trend_lookback_days: 7,
            analytics_lookback_days: 60,
            display_bars: 30,
            correlation_lookback_days: 30,
            correlation_period: 30,
            exclude_keywords: DEFAULT_EXCLUDE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            top_posts: 3,
            preview_chars: 100,
            weights: SourceWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.result_ttl_secs > 0, "result cache TTL must be > 0");
        anyhow::ensure!(self.analytics_ttl_secs > 0, "analytics cache TTL must be > 0");
        anyhow::ensure!(self.source_timeout_secs > 0, "source timeout must be > 0");
        anyhow::ensure!(!self.subreddits.is_empty(), "at least one subreddit is required");
        anyhow::ensure!(self.post_limit >= 1, "post limit must be >= 1");
        anyhow::ensure!(self.news_page_size >= 1, "news page size must be >= 1");
        self.weights.validate()?;
        Ok(())
    }

    pub fn result_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.result_ttl_secs)
    }

    pub fn analytics_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.analytics_ttl_secs)
    }

    pub fn source_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.source_timeout_secs)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

fn split_list(s: &str, sep: char) -> Vec<String> {
    s.split(sep)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.subreddits.len(), 8);
        assert_eq!(cfg.subreddits[0], "wallstreetbets");
        assert!(cfg.exclude_keywords.iter().any(|k| k == "amc 10"));
    }

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(split_list(" a+ +b ", '+'), vec!["a".to_string(), "b".to_string()]);
        assert!(split_list("", ',').is_empty());
    }

    #[test]
    fn rejects_zero_ttl() {
        let cfg = EngineConfig {
            result_ttl_secs: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_provider_url_is_reported_by_name() {
        let err = Settings::default().require_provider_base_url().unwrap_err();
        assert!(err.to_string().contains("PROVIDER_BASE_URL"));
    }
}
