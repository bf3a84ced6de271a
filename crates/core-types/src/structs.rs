use crate::enums::{ExitReason, OrderSide, SignalAction, StrategyKind};
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// A single OHLCV bar as delivered by the market-data collaborator.
///
/// Bars are immutable once received. Use [`PriceBar::new`] when building bars
/// from untrusted input so the `low <= {open, close} <= high` invariant is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Result<Self, CoreError> {
        if low > open || low > close || open > high || close > high {
            return Err(CoreError::InvalidInput(
                "PriceBar".to_string(),
                format!("low {low} <= open {open}, close {close} <= high {high} violated"),
            ));
        }
        if volume.is_sign_negative() && !volume.is_zero() {
            return Err(CoreError::InvalidInput(
                "PriceBar".to_string(),
                format!("volume {volume} is negative"),
            ));
        }
        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// The trading day this bar belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    // Indicator math runs on f64; these are the sanctioned conversion points.
    pub fn open_f64(&self) -> f64 {
        self.open.to_f64().unwrap_or_default()
    }

    pub fn high_f64(&self) -> f64 {
        self.high.to_f64().unwrap_or_default()
    }

    pub fn low_f64(&self) -> f64 {
        self.low.to_f64().unwrap_or_default()
    }

    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or_default()
    }

    pub fn volume_f64(&self) -> f64 {
        self.volume.to_f64().unwrap_or_default()
    }
}

/// A candidate trade produced by one strategy generator for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySignal {
    pub strategy: StrategyKind,
    pub action: SignalAction,
    pub symbol: String,
    /// Whole shares. Zero for `Hold`.
    pub quantity: u64,
    /// In `[0, 1]`.
    pub confidence: f64,
    /// Names the contributing indicators and their values.
    pub reason: String,
}

/// The per-strategy evidence and the final verdict behind an aggregated decision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalReasoning {
    pub contributions: Vec<StrategySignal>,
    pub final_decision: String,
}

/// The single decision for a symbol after the aggregator resolved conflicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSignal {
    pub action: SignalAction,
    pub symbol: String,
    pub quantity: u64,
    pub confidence: f64,
    pub reasoning: SignalReasoning,
}

/// A live position as reported by the portfolio collaborator. Read-only to risk checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: u64,
    pub entry_price: Decimal,
    pub current_price: Decimal,
}

impl Position {
    pub fn market_value(&self) -> Decimal {
        self.current_price * Decimal::from(self.quantity)
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        (self.current_price - self.entry_price) * Decimal::from(self.quantity)
    }
}

/// Portfolio-level health figures evaluated by the kill switches.
/// Fractions are expressed as ratios, so `-0.03` is a 3% daily loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStatus {
    pub total_value: Decimal,
    pub daily_pnl: Decimal,
    pub daily_pnl_percent: Decimal,
    pub current_drawdown: Decimal,
    pub high_water_mark: Decimal,
}

impl PortfolioStatus {
    /// Derives the status from the current value, the previous day's closing value,
    /// and the running high-water mark (which is raised if `total_value` exceeds it).
    pub fn from_values(total_value: Decimal, previous_value: Decimal, high_water_mark: Decimal) -> Self {
        let high_water_mark = high_water_mark.max(total_value);
        let daily_pnl = total_value - previous_value;
        let daily_pnl_percent = if previous_value.is_zero() {
            Decimal::ZERO
        } else {
            daily_pnl / previous_value
        };
        let current_drawdown = if high_water_mark.is_zero() {
            Decimal::ZERO
        } else {
            (high_water_mark - total_value) / high_water_mark
        };
        Self {
            total_value,
            daily_pnl,
            daily_pnl_percent,
            current_drawdown,
            high_water_mark,
        }
    }
}

/// A completed round trip. Immutable once appended to a run's trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub symbol: String,
    pub side: OrderSide,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: u64,
    /// Net of both commissions; slippage is already inside the fill prices.
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
    /// Total commission paid across both legs.
    pub commission: Decimal,
    /// Total slippage cost across both legs.
    pub slippage: Decimal,
    pub holding_period_days: i64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}
