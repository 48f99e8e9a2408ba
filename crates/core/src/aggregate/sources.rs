use crate::aggregate::matching::{merge_unique, text_preview, PostFilter};
use crate::analytics::stock::historical_trend;
use crate::config::EngineConfig;
use crate::domain::market::{normalize_bars, PriceBar};
use crate::domain::prediction::SupportingPost;
use crate::domain::ticker::Ticker;
use crate::error::{SourceUnavailable, UnavailableReason};
use crate::ingest::provider::{NewsTextProvider, PriceHistoryProvider, SocialTextProvider};
use crate::ingest::types::{SearchFilters, SearchSort, SearchWindow};
use crate::sentiment::SentimentScorer;
use crate::time::window::{lookback, DateRange};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

/// Runs one collaborator call under the source timeout.
pub(crate) async fn guarded<T, F>(
    source: &'static str,
    ticker: &str,
    timeout: Duration,
    fut: F,
) -> Result<T, SourceUnavailable>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let reason = match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(v)) => return Ok(v),
        Ok(Err(err)) => UnavailableReason::Upstream(err),
        Err(_) => UnavailableReason::Timeout(timeout),
    };
    let err = SourceUnavailable {
        source,
        ticker: ticker.to_string(),
        reason,
    };
    tracing::warn!(ticker, source, error = %err, "source unavailable; using neutral default");
    Err(err)
}

pub(crate) struct SourceContext<'a> {
    pub ticker: &'a Ticker,
    pub config: &'a EngineConfig,
    pub scorer: &'a SentimentScorer,
    pub now: DateTime<Utc>,
}

impl SourceContext<'_> {
    fn timeout(&self) -> Duration {
        self.config.source_timeout()
    }

    fn window(&self, days: i64) -> DateRange {
        lookback(self.now, days)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SocialOutcome {
    pub score: f64,
    pub count: usize,
    pub top_posts: Vec<SupportingPost>,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScoreOutcome {
    pub score: f64,
    pub available: bool,
}

pub(crate) async fn social_sentiment(
    ctx: &SourceContext<'_>,
    provider: &dyn SocialTextProvider,
) -> SocialOutcome {
    let ticker = ctx.ticker;
    let cfg = ctx.config;
    let filter = PostFilter::for_ticker(ticker, &cfg.exclude_keywords);

    let recent = guarded(
        "social",
        &ticker.id,
        ctx.timeout(),
        provider.recent_posts(&cfg.subreddits, cfg.post_limit),
    )
    .await;
    let Ok(recent) = recent else {
        return SocialOutcome::default();
    };
    let mut posts = filter.apply(recent);

    if posts.len() < cfg.fallback_min_posts {
        if let Some(query) = ticker.profile.fallback_query.as_deref() {
            let filters = SearchFilters {
                subreddits: cfg.subreddits.clone(),
                sort: SearchSort::New,
                window: SearchWindow::Week,
                limit: cfg.search_limit,
            };
            // A failed search keeps whatever the recent feed produced.
            if let Ok(found) = guarded(
                "social_search",
                &ticker.id,
                ctx.timeout(),
                provider.search(query, &filters),
            )
            .await
            {
                let before = posts.len();
                merge_unique(&mut posts, filter.apply(found));
                tracing::debug!(
                    ticker = %ticker.id,
                    query,
                    added = posts.len() - before,
                    "social fallback search"
                );
            }
        }
    }

    let scores: Vec<f64> = posts.iter().map(|p| ctx.scorer.score_item(p)).collect();
    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    let top_posts = posts
        .iter()
        .zip(&scores)
        .take(cfg.top_posts)
        .map(|(p, &sentiment)| SupportingPost {
            title: p.title.clone(),
            source: p.source.clone(),
            sentiment,
            text_preview: text_preview(p.body.as_deref(), cfg.preview_chars),
        })
        .collect();

    tracing::debug!(ticker = %ticker.id, posts = posts.len(), score = mean, "social sentiment");

    SocialOutcome {
        score: mean,
        count: posts.len(),
        top_posts,
        available: !posts.is_empty(),
    }
}

pub(crate) async fn news_sentiment(
    ctx: &SourceContext<'_>,
    provider: &dyn NewsTextProvider,
) -> ScoreOutcome {
    let range = ctx.window(ctx.config.news_lookback_days);
    let query = format!("{} stock", ctx.ticker.symbol());

    let articles = guarded(
        "news",
        &ctx.ticker.id,
        ctx.timeout(),
        provider.search(&query, range.start, range.end, ctx.config.news_page_size),
    )
    .await;
    let Ok(articles) = articles else {
        return ScoreOutcome::default();
    };

    ScoreOutcome {
        score: ctx.scorer.mean_score(&articles),
        available: !articles.is_empty(),
    }
}

pub(crate) async fn trend(
    ctx: &SourceContext<'_>,
    provider: &dyn PriceHistoryProvider,
) -> ScoreOutcome {
    let range = ctx.window(ctx.config.trend_lookback_days);
    let Ok(bars) = fetch_bars("historical", ctx, provider, range).await else {
        return ScoreOutcome::default();
    };

    match historical_trend(&bars) {
        Some(pct) => ScoreOutcome {
            score: pct,
            available: true,
        },
        None => ScoreOutcome::default(),
    }
}

pub(crate) async fn fetch_bars(
    source: &'static str,
    ctx: &SourceContext<'_>,
    provider: &dyn PriceHistoryProvider,
    range: DateRange,
) -> Result<Vec<PriceBar>, SourceUnavailable> {
    let bars = guarded(
        source,
        &ctx.ticker.id,
        ctx.timeout(),
        provider.history(ctx.ticker.symbol(), range.start, range.end),
    )
    .await?;
    Ok(normalize_bars(bars))
}
