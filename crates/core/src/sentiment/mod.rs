pub mod lexicon;

use crate::domain::market::TextItem;
use crate::domain::prediction::clip_sentiment;

/// Stateless lexicon scorer shared by social and news text so their scores are comparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    pub fn new() -> Self {
        Self
    }

    /// Sum of matched lexicon weights, clipped to [-5, 5].
    pub fn score(&self, text: &str) -> f64 {
        let lex = lexicon::lexicon();
        let raw: i64 = tokenize(text)
            .filter_map(|tok| lex.get(tok.as_str()).copied())
            .map(i64::from)
            .sum();
        clip_sentiment(raw as f64)
    }

    pub fn score_item(&self, item: &TextItem) -> f64 {
        self.score(&item.full_text())
    }

    /// Mean of per-item clipped scores; 0 for no items.
    pub fn mean_score(&self, items: &[TextItem]) -> f64 {
        if items.is_empty() {
            return 0.0;
        }
        let total: f64 = items.iter().map(|i| self.score_item(i)).sum();
        total / items.len() as f64
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches('\'').to_ascii_lowercase())
}
