use crate::error::MarketDataError;
use crate::provider::MarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use core_types::PriceBar;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

/// One row of a bar file: `timestamp,open,high,low,close,volume`.
/// Numbers stay text until parsed as `Decimal`, so no precision is lost through `f64`.
#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

/// Reads bars from `<data_dir>/<SYMBOL>_<timeframe>.csv`, falling back to
/// `<data_dir>/<SYMBOL>.csv`.
///
/// Timestamps may be RFC 3339 or plain `YYYY-MM-DD` dates (taken as midnight UTC).
#[derive(Debug, Clone)]
pub struct CsvProvider {
    data_dir: PathBuf,
}

impl CsvProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, MarketDataError> {
        let data_dir = data_dir.into();
        if !data_dir.is_dir() {
            return Err(MarketDataError::Configuration(format!(
                "market data directory '{}' does not exist",
                data_dir.display()
            )));
        }
        Ok(Self { data_dir })
    }

    fn file_for(&self, symbol: &str, timeframe: &str) -> PathBuf {
        let specific = self.data_dir.join(format!("{symbol}_{timeframe}.csv"));
        if specific.is_file() {
            specific
        } else {
            self.data_dir.join(format!("{symbol}.csv"))
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Parses and validates a bar file's contents.
pub(crate) fn parse_bars(symbol: &str, contents: &[u8]) -> Result<Vec<PriceBar>, MarketDataError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(contents);
    let mut bars = Vec::new();

    for (row, record) in reader.deserialize::<CsvBar>().enumerate() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| {
            MarketDataError::fetch(symbol, format!("row {}: bad timestamp '{}'", row + 1, record.timestamp))
        })?;
        let field = |name: &str, raw: &str| {
            Decimal::from_str(raw).map_err(|e| {
                MarketDataError::fetch(symbol, format!("row {}: bad {name} '{raw}': {e}", row + 1))
            })
        };
        let bar = PriceBar::new(
            timestamp,
            field("open", &record.open)?,
            field("high", &record.high)?,
            field("low", &record.low)?,
            field("close", &record.close)?,
            field("volume", &record.volume)?,
        )
        .map_err(|e| MarketDataError::fetch(symbol, format!("row {}: {e}", row + 1)))?;
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

#[async_trait]
impl MarketDataProvider for CsvProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let path = self.file_for(symbol, timeframe);
        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| MarketDataError::fetch(symbol, format!("{}: {e}", path.display())))?;

        let bars = parse_bars(symbol, &contents)?;
        let in_range: Vec<PriceBar> = bars
            .into_iter()
            .filter(|b| (start..=end).contains(&b.date()))
            .collect();
        tracing::debug!(%symbol, bars = in_range.len(), file = %path.display(), "loaded bars from csv");
        Ok(in_range)
    }
}
