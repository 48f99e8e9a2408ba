use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SENTIMENT_BOUND: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    Uptick,
    Downtick,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleSource {
    Social,
    News,
    Historical,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSample {
    pub source: SampleSource,
    pub score: f64,
}

impl SentimentSample {
    /// Clips to the shared [-5, 5] scale; non-finite input becomes 0.
    pub fn new(source: SampleSource, score: f64) -> Self {
        Self {
            source,
            score: clip_sentiment(score),
        }
    }

    pub fn rounded(self) -> Self {
        Self {
            source: self.source,
            score: round2(self.score),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSamples {
    pub social: SentimentSample,
    pub news: SentimentSample,
    pub historical: SentimentSample,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAvailability {
    pub social: bool,
    pub news: bool,
    pub historical: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub volatility: Option<f64>,
    pub rsi: Option<f64>,
    pub bollinger_bands: Option<BollingerBands>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub volume: u64,
}

/// Price-derived part of a result; cached separately from the full result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockAnalytics {
    pub current_price: Option<f64>,
    pub price_change: f64,
    pub price_data: Vec<PricePoint>,
    pub analytics: AnalyticsRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingPost {
    pub title: String,
    pub source: String,
    pub sentiment: f64,
    pub text_preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub ticker: String,
    pub prediction: Prediction,
    pub post_count: usize,
    pub sentiment: SentimentSamples,
    pub source_available: SourceAvailability,
    pub top_posts: Vec<SupportingPost>,
    pub current_price: Option<f64>,
    pub price_change: f64,
    pub price_data: Vec<PricePoint>,
    pub analytics: AnalyticsRecord,
}

/// Pair key (`TSLA-GME`) to coefficient; `None` when the pair lacks overlapping history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationMatrix {
    pairs: BTreeMap<String, Option<f64>>,
}

impl CorrelationMatrix {
    pub fn insert(&mut self, a: &str, b: &str, value: Option<f64>) {
        self.pairs.insert(pair_key(a, b), value);
    }

    /// Order-insensitive lookup. Outer `None` means the pair is not in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<Option<f64>> {
        self.pairs
            .get(&pair_key(a, b))
            .or_else(|| self.pairs.get(&pair_key(b, a)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

pub fn pair_key(a: &str, b: &str) -> String {
    format!("{a}-{b}")
}

pub fn clip_sentiment(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(-SENTIMENT_BOUND, SENTIMENT_BOUND)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
