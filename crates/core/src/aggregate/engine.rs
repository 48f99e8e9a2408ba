use crate::aggregate::sources::{self, SourceContext};
use crate::analytics::correlation::correlation;
use crate::analytics::stock::MIN_BARS_FOR_ANALYTICS;
use crate::cache::clock::Clock;
use crate::cache::TtlCache;
use crate::config::EngineConfig;
use crate::domain::market::PriceBar;
use crate::domain::prediction::{
    CorrelationMatrix, PredictionResult, SampleSource, SentimentSample, SentimentSamples,
    SourceAvailability, StockAnalytics,
};
use crate::domain::ticker::{canonical_id, Ticker, TickerProfile};
use crate::error::RegistryError;
use crate::ingest::provider::{NewsTextProvider, PriceHistoryProvider, SocialTextProvider};
use crate::registry::Registry;
use crate::sentiment::SentimentScorer;
use crate::time::window::lookback;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

const CORRELATIONS_KEY: &str = "correlations";

fn analytics_key(id: &str) -> String {
    format!("analytics:{id}")
}

#[derive(Clone)]
pub struct Providers {
    pub prices: Arc<dyn PriceHistoryProvider>,
    pub social: Arc<dyn SocialTextProvider>,
    pub news: Arc<dyn NewsTextProvider>,
}

impl Providers {
    /// One backend serving all three collaborator roles.
    pub fn from_single<P>(provider: Arc<P>) -> Self
    where
        P: PriceHistoryProvider + SocialTextProvider + NewsTextProvider + 'static,
    {
        Self {
            prices: provider.clone(),
            social: provider.clone(),
            news: provider,
        }
    }
}

/// Values stored in the price-derived cache space.
#[derive(Debug, Clone)]
pub enum PriceDerived {
    Stock(StockAnalytics),
    Correlations(CorrelationMatrix),
}

#[derive(Debug)]
pub struct Caches {
    pub results: TtlCache<PredictionResult>,
    pub analytics: TtlCache<PriceDerived>,
}

impl Caches {
    pub fn from_config(cfg: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            results: TtlCache::new("results", cfg.result_ttl(), clock.clone()),
            analytics: TtlCache::new("analytics", cfg.analytics_ttl(), clock),
        }
    }
}

/// Owns the watch-list and both caches; produces predictions and correlations on demand.
pub struct Engine {
    registry: RwLock<Registry>,
    providers: Providers,
    caches: Caches,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    scorer: SentimentScorer,
}

impl Engine {
    pub fn new(
        registry: Registry,
        providers: Providers,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let caches = Caches::from_config(&config, clock.clone());
        Self {
            registry: RwLock::new(registry),
            providers,
            caches,
            config,
            clock,
            scorer: SentimentScorer::new(),
        }
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    /// Snapshot of the watch-list in registration order.
    pub fn tickers(&self) -> Vec<Ticker> {
        self.read_registry().tickers().to_vec()
    }

    pub fn add_ticker(&self, id: &str, aliases: &[String]) -> Result<Ticker, RegistryError> {
        self.add_ticker_with_profile(id, aliases, TickerProfile::default())
    }

    pub fn add_ticker_with_profile(
        &self,
        id: &str,
        aliases: &[String],
        profile: TickerProfile,
    ) -> Result<Ticker, RegistryError> {
        let ticker = self
            .write_registry()
            .add_with_profile(id, aliases, profile)?
            .clone();

        self.caches.results.invalidate(&ticker.id);
        self.caches.analytics.invalidate(&analytics_key(&ticker.id));
        self.caches.analytics.invalidate(CORRELATIONS_KEY);

        tracing::info!(ticker = %ticker.id, aliases = ?ticker.aliases, "ticker added");
        Ok(ticker)
    }

    /// Prediction for one ticker. Unregistered but well-formed ids are aggregated ad hoc.
    pub async fn aggregate(&self, id: &str) -> Result<PredictionResult, RegistryError> {
        let id = canonical_id(id);
        let registered = self.read_registry().get(&id).cloned();
        let ticker = match registered {
            Some(t) => t,
            None => Ticker::ad_hoc(&id)?,
        };
        Ok(self.aggregate_ticker(&ticker).await)
    }

    /// One result per registered ticker, keyed by ticker id.
    pub async fn aggregate_all(&self) -> BTreeMap<String, PredictionResult> {
        let tickers = self.tickers();
        let mut out = BTreeMap::new();
        for ticker in &tickers {
            let result = self.aggregate_ticker(ticker).await;
            out.insert(ticker.id.clone(), result);
        }
        tracing::info!(tickers = tickers.len(), "aggregation pass finished");
        out
    }

    pub async fn aggregate_ticker(&self, ticker: &Ticker) -> PredictionResult {
        if let Some(hit) = self.caches.results.get(&ticker.id) {
            return hit;
        }

        let ctx = SourceContext {
            ticker,
            config: &self.config,
            scorer: &self.scorer,
            now: self.clock.now(),
        };

        let (social, news, trend, stock) = tokio::join!(
            sources::social_sentiment(&ctx, self.providers.social.as_ref()),
            sources::news_sentiment(&ctx, self.providers.news.as_ref()),
            sources::trend(&ctx, self.providers.prices.as_ref()),
            self.stock_analytics(&ctx),
        );

        let prediction = self
            .config
            .weights
            .predict(social.score, news.score, trend.score);

        let result = PredictionResult {
            ticker: ticker.id.clone(),
            prediction,
            post_count: social.count,
            sentiment: SentimentSamples {
                social: SentimentSample::new(SampleSource::Social, social.score).rounded(),
                news: SentimentSample::new(SampleSource::News, news.score).rounded(),
                historical: SentimentSample::new(SampleSource::Historical, trend.score).rounded(),
            },
            source_available: SourceAvailability {
                social: social.available,
                news: news.available,
                historical: trend.available,
            },
            top_posts: social.top_posts,
            current_price: stock.current_price,
            price_change: stock.price_change,
            price_data: stock.price_data,
            analytics: stock.analytics,
        };

        tracing::info!(
            ticker = %ticker.id,
            prediction = ?result.prediction,
            posts = result.post_count,
            "ticker aggregated"
        );

        self.caches.results.insert(ticker.id.clone(), result.clone());
        result
    }

    async fn stock_analytics(&self, ctx: &SourceContext<'_>) -> StockAnalytics {
        let key = analytics_key(&ctx.ticker.id);
        if let Some(PriceDerived::Stock(hit)) = self.caches.analytics.get(&key) {
            return hit;
        }

        let range = lookback(ctx.now, self.config.analytics_lookback_days);
        let bars =
            match sources::fetch_bars("analytics", ctx, self.providers.prices.as_ref(), range).await
            {
                Ok(b) => b,
                Err(_) => return StockAnalytics::default(),
            };

        let analytics = StockAnalytics::from_bars(&bars, self.config.display_bars);
        if bars.len() >= MIN_BARS_FOR_ANALYTICS {
            self.caches
                .analytics
                .insert(key, PriceDerived::Stock(analytics.clone()));
        }
        analytics
    }

    /// Pairwise return correlations across the watch-list (i<j in registration order).
    pub async fn correlations(&self) -> CorrelationMatrix {
        if let Some(PriceDerived::Correlations(hit)) = self.caches.analytics.get(CORRELATIONS_KEY) {
            return hit;
        }

        let tickers = self.tickers();
        let now = self.clock.now();
        let range = lookback(now, self.config.correlation_lookback_days);

        let mut histories: Vec<Option<Vec<PriceBar>>> = Vec::with_capacity(tickers.len());
        for ticker in &tickers {
            let ctx = SourceContext {
                ticker,
                config: &self.config,
                scorer: &self.scorer,
                now,
            };
            let bars =
                sources::fetch_bars("correlation", &ctx, self.providers.prices.as_ref(), range)
                    .await
                    .ok();
            histories.push(bars);
        }

        let mut matrix = CorrelationMatrix::default();
        for i in 0..tickers.len() {
            for j in (i + 1)..tickers.len() {
                let value = match (&histories[i], &histories[j]) {
                    (Some(a), Some(b)) => correlation(a, b, self.config.correlation_period),
                    _ => None,
                };
                matrix.insert(tickers[i].symbol(), tickers[j].symbol(), value);
            }
        }

        // A matrix with failed fetches is served but not kept.
        if histories.iter().all(Option::is_some) {
            self.caches
                .analytics
                .insert(CORRELATIONS_KEY, PriceDerived::Correlations(matrix.clone()));
        }
        tracing::info!(tickers = tickers.len(), pairs = matrix.len(), "correlations computed");
        matrix
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(|p| p.into_inner())
    }
}
