use crate::error::StrategyError;
use crate::{ensure_history, shares_for, SignalGenerator};
use configuration::BreakoutParams;
use core_types::{PriceBar, SignalAction, StrategyKind, StrategySignal};
use indicators::stats::mean;
use indicators::{atr_series, donchian_channels, volume_profile};
use rust_decimal::Decimal;

/// Breakout distance beyond the channel (as a fraction) that earns the full magnitude score.
const FULL_BREAKOUT_DISTANCE: f64 = 0.02;
/// ATR expansion ratio that earns the full expansion score.
const FULL_ATR_EXPANSION: f64 = 3.0;

/// Donchian channel breakouts confirmed by a volume surge and expanding volatility.
///
/// The channel is built from the bars *before* the one being evaluated, so a close
/// above the prior `donchian_period` highs is a breakout. The ATR must also exceed
/// `atr_expansion_multiplier` times the mean of its own recent values.
#[derive(Debug, Clone)]
pub struct Breakout {
    params: BreakoutParams,
}

impl Breakout {
    pub fn new(params: BreakoutParams) -> Result<Self, StrategyError> {
        params
            .validate()
            .map_err(|e| StrategyError::InvalidParameters(e.to_string()))?;
        Ok(Self { params })
    }
}

impl SignalGenerator for Breakout {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Breakout
    }

    fn min_bars(&self) -> usize {
        self.params.donchian_period + 1
    }

    fn evaluate(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        capital: Decimal,
    ) -> Result<Option<StrategySignal>, StrategyError> {
        ensure_history("Breakout", self.min_bars(), bars)?;
        let p = &self.params;

        let (latest, prior) = match bars.split_last() {
            Some(split) => split,
            None => return Ok(None),
        };
        let price = latest.close_f64();
        let channel = donchian_channels(prior, p.donchian_period)?;
        let volume = volume_profile(bars, p.volume_period)?;

        let atr_values = atr_series(bars, p.atr_period)?;
        let current_atr = atr_values[atr_values.len() - 1];
        let window = p.atr_average_period.min(atr_values.len());
        let atr_average = mean(&atr_values[atr_values.len() - window..]);
        let expansion = if atr_average > 0.0 { current_atr / atr_average } else { 0.0 };

        let (action, edge, distance) = if price > channel.upper {
            (SignalAction::Buy, channel.upper, (price - channel.upper) / channel.upper)
        } else if price < channel.lower {
            (SignalAction::Sell, channel.lower, (channel.lower - price) / channel.lower)
        } else {
            return Ok(None);
        };

        let volume_confirmed = volume.volume_ratio > p.volume_multiplier;
        let volatility_expanding = current_atr > p.atr_expansion_multiplier * atr_average;
        tracing::debug!(
            %symbol, %action, price, edge, ratio = volume.volume_ratio, expansion,
            volume_confirmed, volatility_expanding, "breakout candidate"
        );
        if !volume_confirmed || !volatility_expanding {
            return Ok(None);
        }

        let confidence = 0.4 * (volume.volume_ratio / (2.0 * p.volume_multiplier)).min(1.0)
            + 0.3 * (expansion / FULL_ATR_EXPANSION).min(1.0)
            + 0.3 * (distance / FULL_BREAKOUT_DISTANCE).clamp(0.0, 1.0);

        if confidence <= p.min_confidence {
            return Ok(None);
        }

        let quantity = shares_for(capital, p.position_fraction, latest.close);
        if quantity == 0 {
            return Ok(None);
        }

        let side = if action == SignalAction::Buy { "above Donchian upper" } else { "below Donchian lower" };
        Ok(Some(StrategySignal {
            strategy: StrategyKind::Breakout,
            action,
            symbol: symbol.to_string(),
            quantity,
            confidence,
            reason: format!(
                "Breakout {action}: price {price:.2} {side} {edge:.2}, volume ratio={:.2}x, ATR={current_atr:.4} ({expansion:.2}x its average)",
                volume.volume_ratio
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bar_series;
    use rust_decimal_macros::dec;

    fn generator() -> Breakout {
        Breakout::new(BreakoutParams::default()).unwrap()
    }

    fn range_then(last: (f64, f64, f64, f64)) -> Vec<PriceBar> {
        let mut data = vec![(101.0, 99.0, 100.0, 1000.0); 40];
        data.push(last);
        bar_series(&data)
    }

    #[test]
    fn upside_breakout_with_volume_and_volatility_buys() {
        let signal = generator()
            .evaluate("ACME", &range_then((112.0, 100.0, 110.0, 5000.0)), dec!(100000))
            .unwrap()
            .expect("signal");
        assert_eq!(signal.action, SignalAction::Buy);
        assert!(signal.confidence > 0.6);
        assert!(signal.reason.contains("Donchian"));
        assert!(signal.reason.contains("ATR="));
        // 20% of 100k / 110
        assert_eq!(signal.quantity, 181);
    }

    #[test]
    fn downside_breakout_sells() {
        let signal = generator()
            .evaluate("ACME", &range_then((100.0, 88.0, 90.0, 5000.0)), dec!(100000))
            .unwrap()
            .expect("signal");
        assert_eq!(signal.action, SignalAction::Sell);
    }

    #[test]
    fn breakout_without_volume_is_ignored() {
        let result = generator()
            .evaluate("ACME", &range_then((112.0, 100.0, 110.0, 1000.0)), dec!(100000))
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn close_inside_prior_channel_is_ignored() {
        let result = generator()
            .evaluate("ACME", &range_then((101.0, 99.0, 100.5, 5000.0)), dec!(100000))
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn needs_one_bar_beyond_the_channel_window() {
        let bars = bar_series(&vec![(101.0, 99.0, 100.0, 1000.0); 20]);
        assert!(generator().evaluate("ACME", &bars, dec!(100000)).is_err());
    }
}
