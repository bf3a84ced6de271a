use crate::error::StrategyError;
use crate::{clamp_unit, ensure_history, shares_for, SignalGenerator};
use configuration::MomentumParams;
use core_types::{PriceBar, SignalAction, StrategyKind, StrategySignal};
use indicators::{adx, closes, macd, rsi, sma};
use rust_decimal::Decimal;

/// Price distance above the trend SMA (as a fraction) that earns the full trend score.
const FULL_TREND_EXTENSION: f64 = 0.05;

/// Trend-following entries confirmed by RSI, MACD histogram, ADX and a long SMA.
///
/// Buy when all four agree on an uptrend:
/// `RSI > threshold`, `histogram > 0`, `ADX > threshold`, `price > SMA`.
/// Sell is the mirror image with `RSI < 100 - threshold`.
///
/// Confidence is weighted RSI 40%, MACD 30%, ADX 20%, trend 10%.
#[derive(Debug, Clone)]
pub struct Momentum {
    params: MomentumParams,
}

impl Momentum {
    pub fn new(params: MomentumParams) -> Result<Self, StrategyError> {
        params
            .validate()
            .map_err(|e| StrategyError::InvalidParameters(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &MomentumParams {
        &self.params
    }
}

impl SignalGenerator for Momentum {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Momentum
    }

    fn min_bars(&self) -> usize {
        self.params.min_bars
    }

    fn evaluate(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        capital: Decimal,
    ) -> Result<Option<StrategySignal>, StrategyError> {
        ensure_history("Momentum", self.min_bars(), bars)?;
        let p = &self.params;

        let prices = closes(bars);
        let price = prices[prices.len() - 1];
        let rsi_value = rsi(&prices, p.rsi_period)?;
        let macd_value = macd(&prices, p.macd_fast, p.macd_slow, p.macd_signal)?;
        let adx_value = adx(bars, p.adx_period)?.adx;
        // Shorter histories fall back to an SMA over everything available.
        let trend_period = p.trend_sma_period.min(prices.len());
        let trend_sma = sma(&prices, trend_period)?;
        let histogram = macd_value.histogram;

        tracing::debug!(
            %symbol, rsi = rsi_value, histogram, adx = adx_value, sma = trend_sma, price,
            "momentum indicators"
        );

        let trending = adx_value > p.adx_threshold;
        let bullish = rsi_value > p.rsi_threshold && histogram > 0.0 && price > trend_sma;
        let bearish = rsi_value < 100.0 - p.rsi_threshold && histogram < 0.0 && price < trend_sma;

        let action = match (trending, bullish, bearish) {
            (true, true, _) => SignalAction::Buy,
            (true, false, true) => SignalAction::Sell,
            _ => return Ok(None),
        };

        let rsi_headroom = (100.0 - p.rsi_threshold).max(f64::EPSILON);
        let (rsi_score, macd_score, trend_score) = match action {
            SignalAction::Buy => (
                (rsi_value - p.rsi_threshold) / rsi_headroom,
                histogram / price * 100.0,
                (price / trend_sma - 1.0) / FULL_TREND_EXTENSION,
            ),
            _ => (
                ((100.0 - p.rsi_threshold) - rsi_value) / rsi_headroom,
                -histogram / price * 100.0,
                (1.0 - price / trend_sma) / FULL_TREND_EXTENSION,
            ),
        };
        let adx_score = (adx_value - p.adx_threshold) / p.adx_threshold;

        let confidence = 0.4 * clamp_unit(rsi_score)
            + 0.3 * clamp_unit(macd_score)
            + 0.2 * clamp_unit(adx_score)
            + 0.1 * clamp_unit(trend_score);

        if confidence <= p.min_confidence {
            tracing::debug!(%symbol, confidence, "momentum conditions met but confidence too low");
            return Ok(None);
        }

        let quantity = shares_for(capital, p.position_fraction, bars[bars.len() - 1].close);
        if quantity == 0 {
            return Ok(None);
        }

        Ok(Some(StrategySignal {
            strategy: StrategyKind::Momentum,
            action,
            symbol: symbol.to_string(),
            quantity,
            confidence,
            reason: format!(
                "Momentum {action}: RSI={rsi_value:.2}, MACD histogram={histogram:.4}, ADX={adx_value:.2}, SMA({trend_period})={trend_sma:.2}, price={price:.2}"
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bar_series, geometric_bars};
    use rust_decimal_macros::dec;

    fn generator() -> Momentum {
        Momentum::new(MomentumParams::default()).unwrap()
    }

    #[test]
    fn strong_uptrend_buys() {
        let signal = generator()
            .evaluate("ACME", &geometric_bars(50, 100.0, 1.01), dec!(100000))
            .unwrap()
            .expect("signal");
        assert_eq!(signal.action, SignalAction::Buy);
        assert!(signal.confidence > 0.5 && signal.confidence <= 1.0);
        assert!(signal.reason.contains("Momentum"));
        assert!(signal.reason.contains("RSI="));
        assert!(signal.reason.contains("ADX="));
        // 25% of 100k at the last close, floored.
        let last = 100.0 * 1.01f64.powi(49);
        assert_eq!(signal.quantity, (25000.0 / last).floor() as u64);
    }

    #[test]
    fn accelerating_downtrend_sells() {
        // A constant-rate decline shrinks the (negative) MACD line towards zero, which
        // reads as a positive histogram; the decline has to accelerate.
        let data: Vec<_> = (0..50)
            .map(|i| {
                let c = 200.0 - 0.03 * (i * i) as f64;
                (c + 1.0, c - 1.0, c, 1000.0)
            })
            .collect();
        let signal = generator()
            .evaluate("ACME", &bar_series(&data), dec!(100000))
            .unwrap()
            .expect("signal");
        assert_eq!(signal.action, SignalAction::Sell);
        assert!(signal.reason.starts_with("Momentum sell"));
    }

    #[test]
    fn flat_market_is_silent() {
        let bars = bar_series(&vec![(101.0, 99.0, 100.0, 1000.0); 60]);
        assert_eq!(generator().evaluate("ACME", &bars, dec!(100000)).unwrap(), None);
    }

    #[test]
    fn short_history_is_insufficient_data() {
        let err = generator()
            .evaluate("ACME", &geometric_bars(29, 100.0, 1.01), dec!(100000))
            .unwrap_err();
        assert!(matches!(
            err,
            StrategyError::Indicator(indicators::IndicatorError::InsufficientData { required: 30, .. })
        ));
    }

    #[test]
    fn rejects_invalid_parameters() {
        let params = MomentumParams {
            macd_fast: 26,
            macd_slow: 12,
            ..MomentumParams::default()
        };
        assert!(matches!(Momentum::new(params), Err(StrategyError::InvalidParameters(_))));
    }
}
