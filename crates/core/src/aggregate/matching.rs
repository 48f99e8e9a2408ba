use crate::domain::market::TextItem;
use crate::domain::ticker::Ticker;

/// Subreddit names with this prefix are user profile pages, not communities.
const USER_PAGE_PREFIX: &str = "u_";

/// Decides which social posts count towards a ticker.
#[derive(Debug, Clone)]
pub struct PostFilter {
    /// Lowercased: the ticker id plus every alias.
    needles: Vec<String>,
    /// Lowercased; empty when the ticker's profile skips exclusion filtering.
    exclusions: Vec<String>,
}

impl PostFilter {
    pub fn for_ticker(ticker: &Ticker, exclude_keywords: &[String]) -> Self {
        let mut needles = vec![ticker.id.to_lowercase()];
        needles.extend(ticker.aliases.iter().map(|a| a.to_lowercase()));

        let exclusions = if ticker.profile.skip_exclusions {
            Vec::new()
        } else {
            exclude_keywords.iter().map(|k| k.to_lowercase()).collect()
        };

        Self {
            needles,
            exclusions,
        }
    }

    pub fn matches(&self, item: &TextItem) -> bool {
        if item.source.starts_with(USER_PAGE_PREFIX) {
            return false;
        }

        let text = item.full_text().to_lowercase();
        let mentions = self.needles.iter().any(|n| text.contains(n.as_str()));
        if !mentions {
            return false;
        }

        !self.exclusions.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn apply(&self, items: Vec<TextItem>) -> Vec<TextItem> {
        items.into_iter().filter(|i| self.matches(i)).collect()
    }
}

/// Appends `extra` to `base`, skipping posts already present (same source and title).
pub fn merge_unique(base: &mut Vec<TextItem>, extra: Vec<TextItem>) {
    for item in extra {
        let seen = base
            .iter()
            .any(|b| b.source == item.source && b.title == item.title);
        if !seen {
            base.push(item);
        }
    }
}

/// First `max_chars` characters of the body, with `...` when anything was cut.
pub fn text_preview(body: Option<&str>, max_chars: usize) -> String {
    let Some(body) = body else {
        return String::new();
    };
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
