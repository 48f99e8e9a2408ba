use crate::domain::prediction::Prediction;

pub const UPTICK_THRESHOLD: f64 = 1.0;
pub const DOWNTICK_THRESHOLD: f64 = -1.0;

/// Fixed per-source weights. Inputs share the [-5, 5] scale, so the thresholds above only
/// mean something while the weights are non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceWeights {
    pub news: f64,
    pub reddit: f64,
    pub historical: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            news: 0.6,
            reddit: 0.3,
            historical: 0.1,
        }
    }
}

impl SourceWeights {
    pub fn validate(&self) -> anyhow::Result<()> {
        let all = [self.news, self.reddit, self.historical];
        anyhow::ensure!(
            all.iter().all(|w| w.is_finite() && *w >= 0.0),
            "source weights must be finite and non-negative: {self:?}"
        );
        let sum: f64 = all.iter().sum();
        anyhow::ensure!(
            (sum - 1.0).abs() < 1e-9,
            "source weights must sum to 1.0 (got {sum})"
        );
        Ok(())
    }

    pub fn weighted_score(&self, reddit: f64, news: f64, historical: f64) -> f64 {
        news * self.news + reddit * self.reddit + historical * self.historical
    }

    pub fn predict(&self, reddit: f64, news: f64, historical: f64) -> Prediction {
        classify(self.weighted_score(reddit, news, historical))
    }
}

pub fn classify(score: f64) -> Prediction {
    if score > UPTICK_THRESHOLD {
        Prediction::Uptick
    } else if score < DOWNTICK_THRESHOLD {
        Prediction::Downtick
    } else {
        Prediction::Neutral
    }
}

/// Prediction under the default weights.
pub fn predict(reddit: f64, news: f64, historical: f64) -> Prediction {
    SourceWeights::default().predict(reddit, news, historical)
}
