use std::fmt;
use std::time::Duration;

/// Rejection of a malformed registration or lookup. The registry is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidTicker(String),
    InvalidAlias { ticker: String, alias: String },
    Duplicate(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidTicker(raw) => write!(
                f,
                "invalid ticker {raw:?}: use $ followed by 1-5 uppercase letters (e.g. $BB)"
            ),
            RegistryError::InvalidAlias { ticker, alias } => write!(
                f,
                "invalid alias {alias:?} for {ticker}: aliases must be non-empty and contain only letters and spaces"
            ),
            RegistryError::Duplicate(ticker) => write!(f, "ticker {ticker} already exists"),
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug)]
pub enum UnavailableReason {
    Timeout(Duration),
    Upstream(anyhow::Error),
}

/// A collaborator call that timed out or failed. Converted to a neutral default at the
/// point of use; never propagated out of an aggregation.
#[derive(Debug)]
pub struct SourceUnavailable {
    pub source: &'static str,
    pub ticker: String,
    pub reason: UnavailableReason,
}

impl fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            UnavailableReason::Timeout(after) => write!(
                f,
                "source unavailable (source={}, ticker={}): timed out after {after:?}",
                self.source, self.ticker
            ),
            UnavailableReason::Upstream(err) => write!(
                f,
                "source unavailable (source={}, ticker={}): {err:#}",
                self.source, self.ticker
            ),
        }
    }
}

impl std::error::Error for SourceUnavailable {}
