use crate::analytics::indicators::simple_returns;
use crate::domain::market::PriceBar;
use std::collections::HashMap;

pub const MIN_RETURN_OBSERVATIONS: usize = 10;
pub const DEFAULT_PERIOD: usize = 30;

/// Pearson correlation of daily simple returns over the trailing `period` shared dates.
///
/// `None` when fewer than [`MIN_RETURN_OBSERVATIONS`] returns overlap; `Some(0.0)` when
/// either side has zero variance.
pub fn correlation(a: &[PriceBar], b: &[PriceBar], period: usize) -> Option<f64> {
    let (aligned_a, aligned_b) = align(a, b);
    let start = aligned_a.len().saturating_sub(period);
    let ra = simple_returns(&aligned_a[start..]);
    let rb = simple_returns(&aligned_b[start..]);
    if ra.len() < MIN_RETURN_OBSERVATIONS {
        return None;
    }
    Some(pearson(&ra, &rb))
}

fn align(a: &[PriceBar], b: &[PriceBar]) -> (Vec<PriceBar>, Vec<PriceBar>) {
    let by_date: HashMap<_, _> = b.iter().map(|bar| (bar.date, bar)).collect();
    let mut out_a = Vec::with_capacity(a.len().min(b.len()));
    let mut out_b = Vec::with_capacity(a.len().min(b.len()));
    for bar in a {
        if let Some(other) = by_date.get(&bar.date) {
            out_a.push(bar.clone());
            out_b.push((*other).clone());
        }
    }
    (out_a, out_b)
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut ssx = 0.0;
    let mut ssy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        num += dx * dy;
        ssx += dx * dx;
        ssy += dy * dy;
    }

    let denom = (ssx * ssy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (num / denom).clamp(-1.0, 1.0)
}
