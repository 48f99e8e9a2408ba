use crate::domain::market::PriceBar;
use crate::domain::prediction::{
    clip_sentiment, round2, AnalyticsRecord, PricePoint, StockAnalytics,
};

/// Below this many bars no price figure is reported at all.
pub const MIN_BARS_FOR_ANALYTICS: usize = 5;
pub const DISPLAY_BARS: usize = 30;

impl StockAnalytics {
    /// Current price, day-over-day change (%), trailing display series and indicators, from
    /// one normalized history.
    pub fn from_bars(bars: &[PriceBar], display_bars: usize) -> Self {
        if bars.len() < MIN_BARS_FOR_ANALYTICS {
            return Self::default();
        }

        let last = &bars[bars.len() - 1];
        let previous = &bars[bars.len() - 2];
        let change_pct = (last.close - previous.close) / previous.close * 100.0;

        let start = bars.len().saturating_sub(display_bars);
        let price_data = bars[start..]
            .iter()
            .map(|b| PricePoint {
                date: b.date,
                price: b.close,
                volume: b.volume,
            })
            .collect();

        Self {
            current_price: Some(round2(last.close)),
            price_change: round2(change_pct),
            price_data,
            analytics: AnalyticsRecord::compute(bars),
        }
    }
}

/// Percentage change from first to last close, clipped to the sentiment scale. `None` with
/// fewer than two bars.
pub fn historical_trend(bars: &[PriceBar]) -> Option<f64> {
    let (first, last) = match bars {
        [first, .., last] => (first, last),
        _ => return None,
    };
    let pct = (last.close - first.close) / first.close * 100.0;
    Some(clip_sentiment(pct))
}
