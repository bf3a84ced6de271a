use indicators::IndicatorError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Risk parameters are invalid: {0}")]
    InvalidParameters(String),

    #[error("The provided entry price ({0}) is zero or negative.")]
    InvalidEntryPrice(Decimal),

    /// Stops cannot straddle the entry when the ATR is zero.
    #[error("ATR is zero at entry price {entry_price}; stops would collapse onto the entry")]
    DegenerateAtr { entry_price: Decimal },

    #[error("ATR for stop placement could not be computed: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("A calculation error occurred: {0}")]
    Calculation(String),
}
