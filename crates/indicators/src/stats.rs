//! Small descriptive-statistics helpers shared by the indicators.

/// Arithmetic mean. Returns 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`), as used by Bollinger Bands.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// The trailing `period` values of `values`. Caller guarantees `period <= len`.
pub(crate) fn tail(values: &[f64], period: usize) -> &[f64] {
    &values[values.len() - period..]
}
