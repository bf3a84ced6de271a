use chrono::NaiveDate;
use core_types::StrategyKind;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its documented defaults, so an empty `config.toml`
/// is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backtest: BacktestSettings,
    pub simulation: Simulation,
    pub risk_limits: RiskLimits,
    pub sizing: SizingSettings,
    pub strategies: Strategies,
    pub aggregation: Aggregation,
    pub market_data: MarketDataSettings,
    pub logging: LoggingSettings,
}

/// Contains parameters for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// Symbols replayed when none are given on the command line.
    pub symbols: Vec<String>,
    /// The initial starting capital for the simulation.
    pub initial_capital: Decimal,
    /// Default start of the replay window.
    pub start_date: Option<NaiveDate>,
    /// Default end of the replay window.
    pub end_date: Option<NaiveDate>,
    /// How many trailing bars the pipeline sees on each simulated day.
    pub lookback_bars: usize,
    /// Feed `PortfolioStatus` through the kill switches every day.
    pub enforce_kill_switches: bool,
    pub show_progress: bool,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            initial_capital: dec!(100000),
            start_date: None,
            end_date: None,
            lookback_bars: 100,
            enforce_kill_switches: false,
            show_progress: true,
        }
    }
}

/// Contains parameters for the simulated execution model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Flat commission charged on each leg (entry and exit) of a trade.
    pub commission_per_trade: Decimal,
    /// Adverse slippage as a fraction of the close. 0.001 corresponds to 0.1%.
    pub slippage_pct: Decimal,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            commission_per_trade: dec!(1),
            slippage_pct: dec!(0.001),
        }
    }
}

/// Portfolio-level risk limits. Fractions are of total capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLimits {
    pub max_positions: usize,
    pub max_single_position_pct: Decimal,
    pub max_total_exposure_pct: Decimal,
    pub max_daily_loss_pct: Decimal,
    pub max_drawdown_pct: Decimal,
    pub stop_loss_atr_multiplier: Decimal,
    pub take_profit_atr_multiplier: Decimal,
    pub trailing_stop_enabled: bool,
    pub trailing_stop_distance_pct: Decimal,
    /// ATR lookback used when attaching stops to a new position.
    pub atr_period: usize,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_positions: 5,
            max_single_position_pct: dec!(0.20),
            max_total_exposure_pct: dec!(0.60),
            max_daily_loss_pct: dec!(0.03),
            max_drawdown_pct: dec!(0.15),
            stop_loss_atr_multiplier: dec!(2),
            take_profit_atr_multiplier: dec!(3),
            trailing_stop_enabled: true,
            trailing_stop_distance_pct: dec!(0.02),
            atr_period: 14,
        }
    }
}

/// Parameters for the four position sizers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingSettings {
    /// Fraction of capital used by the fixed-percent sizer.
    pub fixed_fraction: Decimal,
    /// Upper bound on the quarter-Kelly fraction.
    pub kelly_cap: Decimal,
    /// Baseline risk fraction for the inverse-volatility sizer.
    pub inverse_vol_baseline: Decimal,
    /// Upper bound on the inverse-volatility multiplier.
    pub inverse_vol_max_multiplier: Decimal,
    /// Capital fraction at confidence 0.
    pub confidence_min_fraction: Decimal,
    /// Capital fraction at confidence 1.
    pub confidence_max_fraction: Decimal,
}

impl Default for SizingSettings {
    fn default() -> Self {
        Self {
            fixed_fraction: dec!(0.10),
            kelly_cap: dec!(0.05),
            inverse_vol_baseline: dec!(0.02),
            inverse_vol_max_multiplier: dec!(2),
            confidence_min_fraction: dec!(0.01),
            confidence_max_fraction: dec!(0.03),
        }
    }
}

/// Contains the parameter sets for all available strategies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategies {
    pub momentum: MomentumParams,
    pub mean_reversion: MeanReversionParams,
    pub breakout: BreakoutParams,
}

/// Parameters for the RSI / MACD / ADX momentum strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumParams {
    pub min_bars: usize,
    pub rsi_period: usize,
    /// Buy needs RSI above this; sell needs RSI below `100 - rsi_threshold`.
    pub rsi_threshold: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub adx_period: usize,
    /// ADX threshold to confirm trend strength.
    pub adx_threshold: f64,
    /// A long-term SMA acting as the trend filter.
    pub trend_sma_period: usize,
    pub position_fraction: Decimal,
    pub min_confidence: f64,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self {
            min_bars: 30,
            rsi_period: 14,
            rsi_threshold: 50.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            adx_period: 14,
            adx_threshold: 25.0,
            trend_sma_period: 50,
            position_fraction: dec!(0.25),
            min_confidence: 0.5,
        }
    }
}

/// Parameters for the Bollinger / Z-Score mean reversion strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionParams {
    pub min_bars: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub z_score_period: usize,
    pub z_score_threshold: f64,
    pub volume_period: usize,
    /// Latest volume must exceed this multiple of the average.
    pub volume_multiplier: f64,
    pub base_position_fraction: Decimal,
    /// Extra capital fraction per standard deviation beyond the threshold.
    pub fraction_per_extra_sigma: Decimal,
    pub max_position_fraction: Decimal,
    pub min_confidence: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            min_bars: 20,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            z_score_period: 20,
            z_score_threshold: 2.0,
            volume_period: 20,
            volume_multiplier: 1.2,
            base_position_fraction: dec!(0.15),
            fraction_per_extra_sigma: dec!(0.05),
            max_position_fraction: dec!(0.25),
            min_confidence: 0.5,
        }
    }
}

/// Parameters for the Donchian channel breakout strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutParams {
    pub donchian_period: usize,
    pub volume_period: usize,
    pub volume_multiplier: f64,
    pub atr_period: usize,
    /// Window of the ATR series that the current ATR is compared against.
    pub atr_average_period: usize,
    /// Current ATR must exceed this multiple of its own trailing average.
    pub atr_expansion_multiplier: f64,
    pub position_fraction: Decimal,
    pub min_confidence: f64,
}

impl Default for BreakoutParams {
    fn default() -> Self {
        Self {
            donchian_period: 20,
            volume_period: 20,
            volume_multiplier: 2.0,
            atr_period: 14,
            atr_average_period: 20,
            atr_expansion_multiplier: 1.5,
            position_fraction: dec!(0.20),
            min_confidence: 0.6,
        }
    }
}

/// How per-strategy signals are merged into one decision per symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregation {
    pub enabled_strategies: Vec<StrategyKind>,
    pub momentum_weight: f64,
    pub mean_reversion_weight: f64,
    pub breakout_weight: f64,
    /// Cutoff on the weighted confidence. At balanced weights a single generator
    /// signalling alone scores a third of its own confidence.
    pub min_confidence: f64,
    /// Fraction of portfolio equity handed to each generator as its allocated capital.
    pub strategy_capital_fraction: Decimal,
}

impl Default for Aggregation {
    fn default() -> Self {
        Self {
            enabled_strategies: StrategyKind::ALL.to_vec(),
            momentum_weight: 1.0 / 3.0,
            mean_reversion_weight: 1.0 / 3.0,
            breakout_weight: 1.0 / 3.0,
            min_confidence: 0.15,
            strategy_capital_fraction: dec!(0.5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataSettings {
    /// Directory holding one `<SYMBOL>.csv` file per symbol.
    pub data_dir: PathBuf,
    pub timeframe: String,
    pub cache_ttl_secs: u64,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            timeframe: "1d".to_string(),
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `vantage=debug,strategies=trace`.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
