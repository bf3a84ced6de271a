use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("Insufficient data for {indicator}: need {required} values, have {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Invalid period for {indicator}: {reason}")]
    InvalidPeriod {
        indicator: &'static str,
        reason: String,
    },
}

/// Fails with `InsufficientData` unless at least `required` values are present.
pub(crate) fn require(
    indicator: &'static str,
    required: usize,
    available: usize,
) -> Result<(), IndicatorError> {
    if available < required {
        return Err(IndicatorError::InsufficientData {
            indicator,
            required,
            available,
        });
    }
    Ok(())
}

pub(crate) fn require_period(indicator: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod {
            indicator,
            reason: "period must be at least 1".to_string(),
        });
    }
    Ok(())
}
