use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A single symbol could not be fetched. Callers isolate this per symbol.
    #[error("Failed to fetch bars for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    /// The provider is misconfigured. Fatal at startup.
    #[error("Market data configuration error: {0}")]
    Configuration(String),

    #[error("Malformed CSV market data: {0}")]
    Csv(#[from] csv::Error),
}

impl MarketDataError {
    pub fn fetch(symbol: &str, reason: impl Into<String>) -> Self {
        Self::Fetch {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}
