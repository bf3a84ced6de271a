//! # Vantage Market Data
//!
//! The boundary to the market-data collaborator. Everything behind
//! [`MarketDataProvider`] is I/O; everything in front of it works on plain
//! `Vec<PriceBar>`.
//!
//! Caching is explicit: a [`BarCache`] is constructed by the caller and injected
//! through [`CachedProvider`], never held as global state.

pub mod cache;
pub mod csv_provider;
pub mod error;
pub mod provider;

// --- Public API ---
pub use cache::{BarCache, CacheKey, CachedProvider};
pub use csv_provider::CsvProvider;
pub use error::MarketDataError;
pub use provider::{InMemoryProvider, MarketDataProvider};

use chrono::NaiveDate;
use core_types::PriceBar;
use futures::future::join_all;

/// Fetches every symbol concurrently. Each symbol's outcome is reported
/// separately, in input order, so one failing fetch never hides the others.
pub async fn fetch_all<P: MarketDataProvider + ?Sized>(
    provider: &P,
    symbols: &[String],
    timeframe: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<(String, Result<Vec<PriceBar>, MarketDataError>)> {
    let fetches = symbols.iter().map(|symbol| async move {
        let result = provider.fetch_bars(symbol, timeframe, start, end).await;
        if let Err(e) = &result {
            tracing::warn!(%symbol, error = %e, "market data fetch failed");
        }
        (symbol.clone(), result)
    });
    join_all(fetches).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn fetch_all_isolates_failures() {
        let bar = PriceBar::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap(),
            dec!(10),
            dec!(11),
            dec!(9),
            dec!(10.5),
            dec!(100),
        )
        .unwrap();
        let provider = InMemoryProvider::new().with_bars("ACME", vec![bar]);
        let symbols = vec!["MISSING".to_string(), "ACME".to_string()];
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let results = fetch_all(&provider, &symbols, "1d", day, day).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "MISSING");
        assert!(results[0].1.is_err());
        assert_eq!(results[1].1.as_ref().unwrap().len(), 1);
    }
}
