use crate::error::ConfigError;
use crate::settings::{
    Aggregation, BacktestSettings, BreakoutParams, Config, MeanReversionParams, MomentumParams,
    RiskLimits, Simulation, SizingSettings,
};
use rust_decimal::Decimal;

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn fraction(name: &str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
    }
    Ok(())
}

fn unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
    }
    Ok(())
}

fn period(name: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(invalid(format!("{name} must be at least 1")));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value <= 0.0 {
        return Err(invalid(format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

impl Config {
    /// Rejects configurations that could not produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backtest.validate()?;
        self.simulation.validate()?;
        self.risk_limits.validate()?;
        self.sizing.validate()?;
        self.strategies.momentum.validate()?;
        self.strategies.mean_reversion.validate()?;
        self.strategies.breakout.validate()?;
        self.aggregation.validate()?;
        if self.market_data.timeframe.trim().is_empty() {
            return Err(invalid("market_data.timeframe must not be empty"));
        }
        Ok(())
    }
}

impl BacktestSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(invalid("backtest.initial_capital must be positive"));
        }
        period("backtest.lookback_bars", self.lookback_bars)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(invalid(format!("backtest.start_date {start} is after end_date {end}")));
            }
        }
        Ok(())
    }
}

impl Simulation {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commission_per_trade < Decimal::ZERO {
            return Err(invalid("simulation.commission_per_trade must not be negative"));
        }
        if self.slippage_pct < Decimal::ZERO || self.slippage_pct >= Decimal::ONE {
            return Err(invalid("simulation.slippage_pct must be within [0, 1)"));
        }
        Ok(())
    }
}

impl RiskLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        period("risk_limits.max_positions", self.max_positions)?;
        period("risk_limits.atr_period", self.atr_period)?;
        fraction("risk_limits.max_single_position_pct", self.max_single_position_pct)?;
        fraction("risk_limits.max_total_exposure_pct", self.max_total_exposure_pct)?;
        fraction("risk_limits.max_daily_loss_pct", self.max_daily_loss_pct)?;
        fraction("risk_limits.max_drawdown_pct", self.max_drawdown_pct)?;
        fraction("risk_limits.trailing_stop_distance_pct", self.trailing_stop_distance_pct)?;
        if self.max_single_position_pct > self.max_total_exposure_pct {
            return Err(invalid(
                "risk_limits.max_single_position_pct cannot exceed max_total_exposure_pct",
            ));
        }
        if self.stop_loss_atr_multiplier <= Decimal::ZERO
            || self.take_profit_atr_multiplier <= Decimal::ZERO
        {
            return Err(invalid("risk_limits ATR multipliers must be positive"));
        }
        Ok(())
    }
}

impl SizingSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        fraction("sizing.fixed_fraction", self.fixed_fraction)?;
        fraction("sizing.kelly_cap", self.kelly_cap)?;
        fraction("sizing.inverse_vol_baseline", self.inverse_vol_baseline)?;
        fraction("sizing.confidence_min_fraction", self.confidence_min_fraction)?;
        fraction("sizing.confidence_max_fraction", self.confidence_max_fraction)?;
        if self.inverse_vol_max_multiplier <= Decimal::ZERO {
            return Err(invalid("sizing.inverse_vol_max_multiplier must be positive"));
        }
        if self.confidence_min_fraction > self.confidence_max_fraction {
            return Err(invalid(
                "sizing.confidence_min_fraction cannot exceed confidence_max_fraction",
            ));
        }
        Ok(())
    }
}

impl MomentumParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        period("momentum.min_bars", self.min_bars)?;
        period("momentum.rsi_period", self.rsi_period)?;
        period("momentum.macd_fast", self.macd_fast)?;
        period("momentum.macd_signal", self.macd_signal)?;
        period("momentum.adx_period", self.adx_period)?;
        period("momentum.trend_sma_period", self.trend_sma_period)?;
        if self.macd_fast >= self.macd_slow {
            return Err(invalid(format!(
                "momentum.macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !(0.0..=100.0).contains(&self.rsi_threshold) {
            return Err(invalid("momentum.rsi_threshold must be within [0, 100]"));
        }
        positive("momentum.adx_threshold", self.adx_threshold)?;
        fraction("momentum.position_fraction", self.position_fraction)?;
        unit_interval("momentum.min_confidence", self.min_confidence)
    }
}

impl MeanReversionParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        period("mean_reversion.min_bars", self.min_bars)?;
        period("mean_reversion.bollinger_period", self.bollinger_period)?;
        period("mean_reversion.z_score_period", self.z_score_period)?;
        period("mean_reversion.volume_period", self.volume_period)?;
        positive("mean_reversion.bollinger_std_dev", self.bollinger_std_dev)?;
        positive("mean_reversion.z_score_threshold", self.z_score_threshold)?;
        positive("mean_reversion.volume_multiplier", self.volume_multiplier)?;
        fraction("mean_reversion.base_position_fraction", self.base_position_fraction)?;
        fraction("mean_reversion.max_position_fraction", self.max_position_fraction)?;
        if self.fraction_per_extra_sigma < Decimal::ZERO {
            return Err(invalid("mean_reversion.fraction_per_extra_sigma must not be negative"));
        }
        if self.base_position_fraction > self.max_position_fraction {
            return Err(invalid(
                "mean_reversion.base_position_fraction cannot exceed max_position_fraction",
            ));
        }
        unit_interval("mean_reversion.min_confidence", self.min_confidence)
    }
}

impl BreakoutParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        period("breakout.donchian_period", self.donchian_period)?;
        period("breakout.volume_period", self.volume_period)?;
        period("breakout.atr_period", self.atr_period)?;
        period("breakout.atr_average_period", self.atr_average_period)?;
        positive("breakout.volume_multiplier", self.volume_multiplier)?;
        positive("breakout.atr_expansion_multiplier", self.atr_expansion_multiplier)?;
        fraction("breakout.position_fraction", self.position_fraction)?;
        unit_interval("breakout.min_confidence", self.min_confidence)
    }
}

impl Aggregation {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled_strategies.is_empty() {
            return Err(invalid("aggregation.enabled_strategies must name at least one strategy"));
        }
        unit_interval("aggregation.momentum_weight", self.momentum_weight)?;
        unit_interval("aggregation.mean_reversion_weight", self.mean_reversion_weight)?;
        unit_interval("aggregation.breakout_weight", self.breakout_weight)?;
        unit_interval("aggregation.min_confidence", self.min_confidence)?;
        fraction("aggregation.strategy_capital_fraction", self.strategy_capital_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_macd_periods() {
        let mut config = Config::default();
        config.strategies.momentum.macd_fast = 30;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("macd_fast"));
    }

    #[test]
    fn rejects_fraction_above_one() {
        let mut config = Config::default();
        config.risk_limits.max_total_exposure_pct = dec!(1.5);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_full_slippage() {
        let mut config = Config::default();
        config.simulation.slippage_pct = dec!(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_weight_outside_unit_interval() {
        let mut config = Config::default();
        config.aggregation.breakout_weight = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_periods() {
        let mut config = Config::default();
        config.strategies.breakout.donchian_period = 0;
        assert!(config.validate().is_err());
    }
}
