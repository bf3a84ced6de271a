use chrono::NaiveDate;
use core_types::PriceBar;
use events::{EngineEvent, EventSink, SkipStage};
use market_data::{fetch_all, MarketDataProvider};
use std::collections::{BTreeMap, BTreeSet};

/// Bars per symbol, oldest first. Bars dated before the first trading day serve
/// as indicator warm-up.
pub type HistoricalData = BTreeMap<String, Vec<PriceBar>>;

/// Fetches every symbol's bars. Symbols whose fetch fails are reported through
/// `sink` and left out; the rest of the universe is still returned.
pub async fn load_history<P: MarketDataProvider + ?Sized>(
    provider: &P,
    symbols: &[String],
    timeframe: &str,
    start: NaiveDate,
    end: NaiveDate,
    sink: &dyn EventSink,
) -> HistoricalData {
    let mut data = HistoricalData::new();
    for (symbol, outcome) in fetch_all(provider, symbols, timeframe, start, end).await {
        match outcome {
            Ok(bars) if !bars.is_empty() => {
                data.insert(symbol, bars);
            }
            Ok(_) => sink.emit(EngineEvent::SymbolSkipped {
                symbol,
                stage: SkipStage::Fetch,
                reason: "no bars in range".to_string(),
            }),
            Err(e) => sink.emit(EngineEvent::SymbolSkipped {
                symbol,
                stage: SkipStage::Fetch,
                reason: e.to_string(),
            }),
        }
    }
    data
}

/// Every date with at least one bar, inside the optional bounds, ascending.
pub fn trading_days(data: &HistoricalData, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<NaiveDate> {
    let days: BTreeSet<NaiveDate> = data
        .values()
        .flatten()
        .map(PriceBar::date)
        .filter(|d| start.is_none_or(|s| *d >= s))
        .filter(|d| end.is_none_or(|e| *d <= e))
        .collect();
    days.into_iter().collect()
}

/// The bars of `bars` dated on or before `date`, at most `lookback` of them.
pub fn window(bars: &[PriceBar], date: NaiveDate, lookback: usize) -> &[PriceBar] {
    let end = bars.partition_point(|b| b.date() <= date);
    &bars[end.saturating_sub(lookback)..end]
}

/// The bar of `bars` dated exactly `date`, if any.
pub fn bar_on(bars: &[PriceBar], date: NaiveDate) -> Option<&PriceBar> {
    let end = bars.partition_point(|b| b.date() <= date);
    end.checked_sub(1)
        .map(|i| &bars[i])
        .filter(|bar| bar.date() == date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::flat_bars;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn trading_days_are_the_union_of_bar_dates() {
        let mut data = HistoricalData::new();
        data.insert("A".to_string(), flat_bars(day(1), 3, 10.0));
        data.insert("B".to_string(), flat_bars(day(2), 3, 10.0));
        assert_eq!(trading_days(&data, None, None), vec![day(1), day(2), day(3), day(4)]);
        assert_eq!(trading_days(&data, Some(day(2)), Some(day(3))), vec![day(2), day(3)]);
    }

    #[test]
    fn window_excludes_future_bars() {
        let bars = flat_bars(day(1), 10, 10.0);
        let w = window(&bars, day(5), 3);
        assert_eq!(w.len(), 3);
        assert_eq!(w[2].date(), day(5));
        assert_eq!(window(&bars, day(2), 5).len(), 2);
        assert!(bar_on(&bars, day(5)).is_some());
        assert!(bar_on(&bars, day(20)).is_none());
    }
}
