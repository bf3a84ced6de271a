use indicators::IndicatorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("An error occurred during indicator calculation: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Strategy of type '{0}' not found or not enabled")]
    StrategyNotFound(String),
}
