use crate::domain::ticker::{Ticker, TickerProfile};
use crate::error::RegistryError;

/// Ordered in-memory watch-list; registration order drives result and correlation order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tickers: Vec<Ticker>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock watch-list the service starts with.
    pub fn with_default_watchlist() -> Self {
        let mut reg = Self::new();
        let defaults: [(&str, &[&str], TickerProfile); 6] = [
            ("$TSLA", &["Tesla"], TickerProfile::default()),
            (
                "$GME",
                &["GameStop"],
                TickerProfile::default().with_fallback_query("$GME stock"),
            ),
            (
                "$AMC",
                &["AMC Entertainment"],
                TickerProfile::default().with_fallback_query("$AMC stock"),
            ),
            ("$NVDA", &["Nvidia"], TickerProfile::default()),
            ("$SPY", &["S&P 500"], TickerProfile::default()),
            (
                "$BB",
                &["BlackBerry"],
                TickerProfile::default()
                    .with_fallback_query("$BB OR blackberry stock")
                    .skipping_exclusions(),
            ),
        ];
        for (id, aliases, profile) in defaults {
            // Static entries; a failure here is a programmer error caught by tests.
            let added =
                Ticker::builtin(id, aliases, profile).and_then(|t| reg.push(t).map(|_| ()));
            if let Err(err) = added {
                tracing::error!(ticker = id, error = %err, "invalid default watch-list entry");
            }
        }
        reg
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn get(&self, id: &str) -> Option<&Ticker> {
        self.tickers.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn add(&mut self, id: &str, aliases: &[String]) -> Result<&Ticker, RegistryError> {
        self.add_with_profile(id, aliases, TickerProfile::default())
    }

    pub fn add_with_profile(
        &mut self,
        id: &str,
        aliases: &[String],
        profile: TickerProfile,
    ) -> Result<&Ticker, RegistryError> {
        let ticker = Ticker::try_new(id, aliases, profile)?;
        self.push(ticker)
    }

    fn push(&mut self, ticker: Ticker) -> Result<&Ticker, RegistryError> {
        if self.contains(&ticker.id) {
            return Err(RegistryError::Duplicate(ticker.id));
        }
        self.tickers.push(ticker);
        let idx = self.tickers.len() - 1;
        Ok(&self.tickers[idx])
    }
}
