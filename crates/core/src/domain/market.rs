use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Social,
    News,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub title: String,
    pub body: Option<String>,
    /// Subreddit name for social items, publisher for news.
    pub source: String,
    pub origin: Origin,
}

impl TextItem {
    /// Title and body joined by a space; the unit the scorer and the filters operate on.
    pub fn full_text(&self) -> String {
        match self.body.as_deref() {
            Some(body) if !body.is_empty() => format!("{} {}", self.title, body),
            _ => self.title.clone(),
        }
    }
}

/// Chronological, one bar per date (last wins), finite positive closes only.
pub fn normalize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.retain(|b| b.close.is_finite() && b.close > 0.0);
    // Stable sort keeps provider order within a date so "last wins" below is well defined.
    bars.sort_by_key(|b| b.date);

    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.date == bar.date => *prev = bar,
            _ => out.push(bar),
        }
    }
    out
}
