use crate::error::MarketDataError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceBar;
use std::collections::HashMap;

/// The abstract interface to whatever supplies historical bars.
///
/// Implementations return bars for `symbol` whose dates fall within
/// `[start, end]` (inclusive), ordered oldest first.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError>;
}

#[async_trait]
impl<P: MarketDataProvider + ?Sized> MarketDataProvider for std::sync::Arc<P> {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        (**self).fetch_bars(symbol, timeframe, start, end).await
    }
}

/// Serves pre-loaded bars from memory, ignoring the timeframe.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    bars: HashMap<String, Vec<PriceBar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        self.bars.insert(symbol.to_string(), bars);
        self
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        _timeframe: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let bars = self
            .bars
            .get(symbol)
            .ok_or_else(|| MarketDataError::fetch(symbol, "unknown symbol"))?;
        Ok(bars
            .iter()
            .filter(|b| (start..=end).contains(&b.date()))
            .cloned()
            .collect())
    }
}
