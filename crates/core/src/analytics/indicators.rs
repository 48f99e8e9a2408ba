//! Trailing-window indicators over daily closes.
//!
//! Every function checks its own minimum history against the same series and returns `None`
//! when it is not met, so a short series yields a partially populated [`AnalyticsRecord`].

use crate::domain::market::PriceBar;
use crate::domain::prediction::{AnalyticsRecord, BollingerBands};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const VOLATILITY_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_K: f64 = 2.0;

pub fn moving_average(bars: &[PriceBar], period: usize) -> Option<f64> {
    let window = trailing(bars, period)?;
    Some(mean(window.iter().map(|b| b.close)))
}

/// Annualized sample standard deviation of simple daily returns across the last `period` bars.
pub fn volatility(bars: &[PriceBar], period: usize) -> Option<f64> {
    let window = trailing(bars, period)?;
    let returns = simple_returns(window);
    let sd = sample_std_dev(&returns)?;
    let annualized = sd * TRADING_DAYS_PER_YEAR.sqrt();
    annualized.is_finite().then_some(annualized)
}

pub fn rsi(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 {
        return None;
    }
    let window = trailing(bars, period + 1)?;

    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1].close - pair[0].close;
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}

pub fn bollinger_bands(bars: &[PriceBar], period: usize, k: f64) -> Option<BollingerBands> {
    let window = trailing(bars, period)?;
    let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
    let middle = mean(closes.iter().copied());
    let half_width = k * sample_std_dev(&closes)?;
    Some(BollingerBands {
        upper: middle + half_width,
        middle,
        lower: middle - half_width,
    })
}

impl AnalyticsRecord {
    pub fn compute(bars: &[PriceBar]) -> Self {
        Self {
            sma20: moving_average(bars, 20),
            sma50: moving_average(bars, 50),
            volatility: volatility(bars, VOLATILITY_PERIOD),
            rsi: rsi(bars, RSI_PERIOD),
            bollinger_bands: bollinger_bands(bars, BOLLINGER_PERIOD, BOLLINGER_K),
        }
    }
}

pub(crate) fn simple_returns(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .collect()
}

fn trailing(bars: &[PriceBar], period: usize) -> Option<&[PriceBar]> {
    if period == 0 || bars.len() < period {
        return None;
    }
    Some(&bars[bars.len() - period..])
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    values.sum::<f64>() / n as f64
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values.iter().copied());
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    pub(crate) fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                close,
                volume: 1_000,
            })
            .collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn short_series_yields_nulls_without_panicking() {
        let bars = bars_from_closes(&[10.0, 10.5, 11.0, 10.8, 11.2]);
        let rec = AnalyticsRecord::compute(&bars);
        assert_eq!(rec.sma20, None);
        assert_eq!(rec.sma50, None);
        assert_eq!(rec.volatility, None);
        assert_eq!(rec.rsi, None);
        assert_eq!(rec.bollinger_bands, None);

        assert_eq!(moving_average(&[], 1), None);
        assert_eq!(rsi(&bars, 0), None);
    }

    #[test]
    fn partial_record_when_only_some_windows_fit() {
        // 20 bars: sma20, volatility, RSI, Bollinger fit; sma50 does not.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let rec = AnalyticsRecord::compute(&bars_from_closes(&closes));
        assert!(rec.sma20.is_some());
        assert!(rec.sma50.is_none());
        assert!(rec.volatility.is_some());
        assert!(rec.rsi.is_some());
        assert!(rec.bollinger_bands.is_some());
    }

    #[test]
    fn sma_uses_trailing_window() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_close(moving_average(&bars, 2).unwrap(), 4.5);
        assert_close(moving_average(&bars, 5).unwrap(), 3.0);
        assert_eq!(moving_average(&bars, 6), None);
    }

    #[test]
    fn rsi_rises_above_50_in_uptrend() {
        // Uptrend with shallow pullbacks.
        let closes: Vec<f64> = (0..30)
            .map(|i| 50.0 + i as f64 * 0.8 - if i % 4 == 0 { 1.0 } else { 0.0 })
            .collect();
        let v = rsi(&bars_from_closes(&closes), RSI_PERIOD).unwrap();
        assert!(v > 50.0, "rsi={v}");
        assert!(v <= 100.0);
    }

    #[test]
    fn rsi_is_exactly_100_without_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 10.0 + i as f64).collect();
        assert_eq!(rsi(&bars_from_closes(&closes), 14), Some(100.0));
        // Flat series: no gains, no losses, still no division by zero.
        assert_eq!(rsi(&bars_from_closes(&[5.0; 15]), 14), Some(100.0));
    }

    #[test]
    fn rsi_is_zero_without_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 30.0 - i as f64).collect();
        assert_close(rsi(&bars_from_closes(&closes), 14).unwrap(), 0.0);
    }

    #[test]
    fn rsi_needs_period_plus_one_bars() {
        let closes: Vec<f64> = (0..14).map(|i| 10.0 + i as f64).collect();
        assert_eq!(rsi(&bars_from_closes(&closes), 14), None);
    }

    #[test]
    fn known_rsi_value() {
        // Changes: +1, -1, +2 over period 3 => avg gain 1, avg loss 1/3 => rs 3 => 75.
        let bars = bars_from_closes(&[10.0, 11.0, 10.0, 12.0]);
        assert_close(rsi(&bars, 3).unwrap(), 75.0);
    }

    #[test]
    fn volatility_of_constant_growth_is_zero() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let v = volatility(&bars_from_closes(&closes), 20).unwrap();
        assert!(v >= 0.0);
        assert!(v < 1e-9);
    }

    #[test]
    fn volatility_annualizes_sample_sd() {
        // Returns: +10%, -10% => mean 0, sample sd = sqrt(0.02 / 1).
        let bars = bars_from_closes(&[100.0, 110.0, 99.0]);
        let expected = 0.02_f64.sqrt() * 252.0_f64.sqrt();
        assert_close(volatility(&bars, 3).unwrap(), expected);
        // Two bars give one return: no sample deviation.
        assert_eq!(volatility(&bars, 2), None);
    }

    #[test]
    fn bollinger_bands_bracket_the_mean() {
        let bars = bars_from_closes(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let bb = bollinger_bands(&bars, 8, 2.0).unwrap();
        assert_close(bb.middle, 5.0);
        // sample variance = 32 / 7
        let half = 2.0 * (32.0_f64 / 7.0).sqrt();
        assert_close(bb.upper, 5.0 + half);
        assert_close(bb.lower, 5.0 - half);
        assert!(bollinger_bands(&bars, 9, 2.0).is_none());
    }
}
