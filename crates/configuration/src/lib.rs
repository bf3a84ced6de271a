use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;
mod validation;

#[cfg(feature = "clap")]
pub mod cli;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Aggregation, BacktestSettings, BreakoutParams, Config, LoggingSettings, MarketDataSettings,
    MeanReversionParams, MomentumParams, RiskLimits, Simulation, SizingSettings, Strategies,
};
pub use telemetry::init_tracing;

#[cfg(feature = "clap")]
pub use cli::ConfigArgs;

/// Prefix of environment variables that override file values,
/// e.g. `VANTAGE__RISK_LIMITS__MAX_POSITIONS=3`.
pub const ENV_PREFIX: &str = "VANTAGE";

/// Loads and validates the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file at `path` (optional;
/// a missing file leaves the defaults in place), then `VANTAGE__*` environment
/// variables.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("backtest.symbols")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.as_ref().display(), "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("vantage-config-{}-{name}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config("/nonexistent/vantage.toml").unwrap();
        assert_eq!(config.risk_limits, RiskLimits::default());
        assert_eq!(config.strategies.momentum.rsi_period, 14);
    }

    #[test]
    fn file_values_override_defaults_section_by_section() {
        let path = write_temp(
            "partial",
            r#"
            [risk_limits]
            max_positions = 3
            max_single_position_pct = 0.10

            [strategies.breakout]
            donchian_period = 55
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.risk_limits.max_positions, 3);
        assert_eq!(config.risk_limits.max_single_position_pct, dec!(0.10));
        assert_eq!(config.risk_limits.max_drawdown_pct, dec!(0.15));
        assert_eq!(config.strategies.breakout.donchian_period, 55);
        assert_eq!(config.strategies.breakout.volume_multiplier, 2.0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn invalid_file_is_rejected() {
        let path = write_temp(
            "invalid",
            r#"
            [aggregation]
            min_confidence = 1.5
            "#,
        );
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
        let _ = std::fs::remove_file(path);
    }
}
