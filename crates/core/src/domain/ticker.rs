use crate::error::RegistryError;
use serde::{Deserialize, Serialize};

pub const TICKER_SIGIL: char = '$';
const MAX_SYMBOL_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Canonical id, e.g. `$TSLA`.
    pub id: String,
    /// Text-matching aliases. The bare symbol is always first.
    pub aliases: Vec<String>,
    #[serde(default)]
    pub profile: TickerProfile,
}

/// Per-ticker filtering policy, fixed at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerProfile {
    /// Keep posts even when they mention an exclusion keyword ("BB" collides with too many
    /// of them to be filtered usefully).
    #[serde(default)]
    pub skip_exclusions: bool,

    /// Social search query used when too few recent posts match.
    #[serde(default)]
    pub fallback_query: Option<String>,
}

impl TickerProfile {
    pub fn with_fallback_query(mut self, query: impl Into<String>) -> Self {
        self.fallback_query = Some(query.into());
        self
    }

    pub fn skipping_exclusions(mut self) -> Self {
        self.skip_exclusions = true;
        self
    }
}

impl Ticker {
    pub fn try_new(
        id: &str,
        aliases: &[String],
        profile: TickerProfile,
    ) -> Result<Self, RegistryError> {
        validate_id(id)?;

        let mut out = vec![bare_symbol(id).to_string()];
        for alias in aliases {
            let alias = validate_alias(id, alias)?;
            if !out.iter().any(|a| a.eq_ignore_ascii_case(&alias)) {
                out.push(alias);
            }
        }

        Ok(Self {
            id: id.to_string(),
            aliases: out,
            profile,
        })
    }

    /// Built-in watch-list entry. Aliases are taken as written (`S&P 500` is fine here); only
    /// the id is checked.
    pub(crate) fn builtin(
        id: &str,
        aliases: &[&str],
        profile: TickerProfile,
    ) -> Result<Self, RegistryError> {
        validate_id(id)?;

        let mut out = vec![bare_symbol(id).to_string()];
        for alias in aliases.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
            if !out.iter().any(|a| a.eq_ignore_ascii_case(alias)) {
                out.push(alias.to_string());
            }
        }

        Ok(Self {
            id: id.to_string(),
            aliases: out,
            profile,
        })
    }

    /// A ticker that is not registered: matched by its bare symbol only.
    pub fn ad_hoc(id: &str) -> Result<Self, RegistryError> {
        Self::try_new(id, &[], TickerProfile::default())
    }

    /// Symbol used with the price provider (`TSLA` for `$TSLA`).
    pub fn symbol(&self) -> &str {
        bare_symbol(&self.id)
    }
}

pub fn validate_id(id: &str) -> Result<(), RegistryError> {
    let Some(symbol) = id.strip_prefix(TICKER_SIGIL) else {
        return Err(RegistryError::InvalidTicker(id.to_string()));
    };
    let ok = (1..=MAX_SYMBOL_LEN).contains(&symbol.len())
        && symbol.bytes().all(|b| b.is_ascii_uppercase());
    if !ok {
        return Err(RegistryError::InvalidTicker(id.to_string()));
    }
    Ok(())
}

/// `tsla`, `$tsla` and ` TSLA ` all become `$TSLA`. The result still has to pass
/// [`validate_id`].
pub fn canonical_id(raw: &str) -> String {
    let t = raw.trim();
    let t = t.strip_prefix(TICKER_SIGIL).unwrap_or(t);
    format!("{TICKER_SIGIL}{}", t.to_ascii_uppercase())
}

fn validate_alias(id: &str, alias: &str) -> Result<String, RegistryError> {
    let trimmed = alias.trim();
    let ok = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ');
    if !ok {
        return Err(RegistryError::InvalidAlias {
            ticker: id.to_string(),
            alias: alias.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn bare_symbol(id: &str) -> &str {
    id.strip_prefix(TICKER_SIGIL).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sigil_and_uppercase_symbol() {
        let t = Ticker::try_new("$BB", &["BlackBerry".to_string()], TickerProfile::default())
            .unwrap();
        assert_eq!(t.symbol(), "BB");
        assert_eq!(t.aliases, vec!["BB".to_string(), "BlackBerry".to_string()]);
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["TSLA", "$tsla", "$", "$TOOLONG", "$TS1A", "$ TSLA", ""] {
            assert!(
                matches!(validate_id(bad), Err(RegistryError::InvalidTicker(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_aliases_with_symbols_or_digits() {
        let err = Ticker::try_new("$AMC", &["AMC 10".to_string()], TickerProfile::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAlias { .. }));

        let err = Ticker::try_new("$AMC", &["   ".to_string()], TickerProfile::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAlias { .. }));
    }

    #[test]
    fn drops_alias_duplicating_symbol() {
        let t = Ticker::try_new(
            "$NVDA",
            &["nvda".to_string(), " Nvidia ".to_string()],
            TickerProfile::default(),
        )
        .unwrap();
        assert_eq!(t.aliases, vec!["NVDA".to_string(), "Nvidia".to_string()]);
    }

    #[test]
    fn canonicalizes_route_input() {
        assert_eq!(canonical_id("tsla"), "$TSLA");
        assert_eq!(canonical_id(" $gme "), "$GME");
        assert!(validate_id(&canonical_id("spy")).is_ok());
    }
}
