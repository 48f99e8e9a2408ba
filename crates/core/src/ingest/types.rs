use crate::domain::market::{normalize_bars, Origin, PriceBar, TextItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSort {
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchWindow {
    Week,
}

impl SearchSort {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchSort::New => "new",
        }
    }
}

impl SearchWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchWindow::Week => "week",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    pub subreddits: Vec<String>,
    pub sort: SearchSort,
    pub window: SearchWindow,
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub bars: Vec<WireBar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireBar {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl HistoryResponse {
    pub fn into_bars(self) -> Vec<PriceBar> {
        let bars = self
            .bars
            .into_iter()
            .map(|b| PriceBar {
                date: b.date,
                close: b.close,
                volume: b
                    .volume
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v.round() as u64)
                    .unwrap_or(0),
            })
            .collect();
        normalize_bars(bars)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextItemsResponse {
    #[serde(default)]
    pub items: Vec<WireTextItem>,
}

/// Social posts use `body`; news articles usually send `description`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireTextItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "selftext", alias = "description")]
    pub body: Option<String>,
    #[serde(default, alias = "subreddit")]
    pub source: Option<String>,
}

impl TextItemsResponse {
    /// Items without a title carry nothing to match or score and are dropped.
    pub fn into_items(self, origin: Origin) -> Vec<TextItem> {
        self.items
            .into_iter()
            .filter_map(|w| {
                let title = w.title?.trim().to_string();
                if title.is_empty() {
                    return None;
                }
                Some(TextItem {
                    title,
                    body: w.body.filter(|b| !b.trim().is_empty()),
                    source: w.source.unwrap_or_default(),
                    origin,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_is_normalized_on_conversion() {
        let v = json!({
            "bars": [
                {"date": "2026-03-03", "close": 11.0, "volume": 1200.0},
                {"date": "2026-03-02", "close": 10.0},
                {"date": "2026-03-03", "close": 11.5, "volume": 900},
                {"date": "2026-03-04", "close": -1.0, "volume": 5}
            ]
        });
        let parsed: HistoryResponse = serde_json::from_value(v).unwrap();
        let bars = parsed.into_bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].volume, 0);
        assert_eq!(bars[1].close, 11.5);
        assert_eq!(bars[1].volume, 900);
    }

    #[test]
    fn rejects_non_numeric_close_via_deserialize() {
        let v = json!({"bars": [{"date": "2026-03-02", "close": "10.0"}]});
        assert!(serde_json::from_value::<HistoryResponse>(v).is_err());
    }

    #[test]
    fn text_items_accept_vendor_field_names() {
        let v = json!({
            "items": [
                {"title": "GME squeeze", "selftext": "moon", "subreddit": "wallstreetbets"},
                {"title": "Nvidia beats", "description": "record quarter", "source": "Reuters"},
                {"title": "   "},
                {"selftext": "no title"}
            ]
        });
        let parsed: TextItemsResponse = serde_json::from_value(v).unwrap();
        let items = parsed.into_items(Origin::Social);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "wallstreetbets");
        assert_eq!(items[0].body.as_deref(), Some("moon"));
        assert_eq!(items[1].body.as_deref(), Some("record quarter"));
        assert!(items.iter().all(|i| i.origin == Origin::Social));
    }
}
