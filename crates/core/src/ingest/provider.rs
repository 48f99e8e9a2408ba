use crate::config::Settings;
use crate::domain::market::{Origin, PriceBar, TextItem};
use crate::ingest::types::{HistoryResponse, SearchFilters, TextItemsResponse};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[async_trait::async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Daily bars for `symbol` (bare, e.g. `TSLA`) with `start <= date <= end`.
    async fn history(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<PriceBar>>;
}

#[async_trait::async_trait]
pub trait SocialTextProvider: Send + Sync {
    async fn recent_posts(&self, subreddits: &[String], limit: usize) -> Result<Vec<TextItem>>;

    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<TextItem>>;
}

#[async_trait::async_trait]
pub trait NewsTextProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
        page_size: usize,
    ) -> Result<Vec<TextItem>>;
}

const HISTORY_PATH: &str = "/v1/history";
const SOCIAL_RECENT_PATH: &str = "/v1/social/recent";
const SOCIAL_SEARCH_PATH: &str = "/v1/social/search";
const NEWS_SEARCH_PATH: &str = "/v1/news/search";

/// Reads already-normalized market data from one JSON gateway. Speaks no vendor protocol.
#[derive(Debug, Clone)]
pub struct HttpJsonProvider {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl HttpJsonProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_provider_base_url()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.provider_timeout_secs))
            .build()
            .context("failed to build provider http client")?;

        Ok(Self {
            http,
            base_url,
            retries: settings.provider_retries.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<std::result::Result<T, Retryable>> {
        let res = match self.http.get(self.url(path)).query(query).send().await {
            Ok(r) => r,
            Err(err) => {
                return Ok(Err(Retryable(
                    anyhow::Error::new(err).context(format!("provider request to {path} failed")),
                )))
            }
        };

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read provider response from {path}"))?;

        if !status.is_success() {
            let err = anyhow::anyhow!("provider {path} HTTP {status}: {text}");
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                return Ok(Err(Retryable(err)));
            }
            return Err(err);
        }

        let parsed = serde_json::from_str::<T>(&text)
            .with_context(|| format!("provider response from {path} has unexpected shape"))?;
        Ok(Ok(parsed))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.get_once::<T>(path, query).await? {
                Ok(parsed) => return Ok(parsed),
                Err(Retryable(err)) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, path, error = %err, "provider fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

struct Retryable(anyhow::Error);

#[async_trait::async_trait]
impl PriceHistoryProvider for HttpJsonProvider {
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let query = [
            ("symbol", symbol.to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
            ("interval", "1d".to_string()),
        ];
        let res: HistoryResponse = self.get_json(HISTORY_PATH, &query).await?;
        Ok(res.into_bars())
    }
}

#[async_trait::async_trait]
impl SocialTextProvider for HttpJsonProvider {
    async fn recent_posts(&self, subreddits: &[String], limit: usize) -> Result<Vec<TextItem>> {
        let query = [
            ("subreddits", subreddits.join("+")),
            ("limit", limit.to_string()),
        ];
        let res: TextItemsResponse = self.get_json(SOCIAL_RECENT_PATH, &query).await?;
        Ok(res.into_items(Origin::Social))
    }

    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<TextItem>> {
        let params = [
            ("q", query.to_string()),
            ("subreddits", filters.subreddits.join("+")),
            ("sort", filters.sort.as_str().to_string()),
            ("time", filters.window.as_str().to_string()),
            ("limit", filters.limit.to_string()),
        ];
        let res: TextItemsResponse = self.get_json(SOCIAL_SEARCH_PATH, &params).await?;
        Ok(res.into_items(Origin::Social))
    }
}

#[async_trait::async_trait]
impl NewsTextProvider for HttpJsonProvider {
    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
        page_size: usize,
    ) -> Result<Vec<TextItem>> {
        let params = [
            ("q", query.to_string()),
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("page_size", page_size.to_string()),
        ];
        let res: TextItemsResponse = self.get_json(NEWS_SEARCH_PATH, &params).await?;
        Ok(res.into_items(Origin::News))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> HttpJsonProvider {
        HttpJsonProvider {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            retries: 1,
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(
            provider("http://gateway:8080/").url(HISTORY_PATH),
            "http://gateway:8080/v1/history"
        );
        assert_eq!(
            provider("http://gateway:8080").url(NEWS_SEARCH_PATH),
            "http://gateway:8080/v1/news/search"
        );
    }

    #[test]
    fn from_settings_requires_base_url() {
        let mut settings = Settings::default();
        assert!(HttpJsonProvider::from_settings(&settings).is_err());

        settings.provider_base_url = Some("http://localhost:9000".to_string());
        settings.provider_retries = 0;
        let p = HttpJsonProvider::from_settings(&settings).unwrap();
        assert_eq!(p.retries, 1);
    }
}
