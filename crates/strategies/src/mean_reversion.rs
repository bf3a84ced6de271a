use crate::error::StrategyError;
use crate::{ensure_history, shares_for, SignalGenerator};
use configuration::MeanReversionParams;
use core_types::{PriceBar, SignalAction, StrategyKind, StrategySignal};
use indicators::{bollinger_bands, closes, volume_profile, z_score};
use rust_decimal::prelude::*;

/// Fades statistically stretched moves that arrive on heavy volume.
///
/// Buy when price closes below the lower Bollinger band, the Z-Score is below
/// `-threshold` and volume exceeds `volume_multiplier` times its average. Sell is
/// symmetric at the upper band.
#[derive(Debug, Clone)]
pub struct MeanReversion {
    params: MeanReversionParams,
}

impl MeanReversion {
    pub fn new(params: MeanReversionParams) -> Result<Self, StrategyError> {
        params
            .validate()
            .map_err(|e| StrategyError::InvalidParameters(e.to_string()))?;
        Ok(Self { params })
    }

    /// Capital fraction for a given |Z|: grows with extremeness, capped.
    fn position_fraction(&self, abs_z: f64) -> Decimal {
        let p = &self.params;
        let extra_sigma = Decimal::from_f64((abs_z - p.z_score_threshold).max(0.0)).unwrap_or_default();
        (p.base_position_fraction + p.fraction_per_extra_sigma * extra_sigma).min(p.max_position_fraction)
    }
}

impl SignalGenerator for MeanReversion {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MeanReversion
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
        ensure_history("MeanReversion", self.min_bars(), bars)?;
        let p = &self.params;

        let prices = closes(bars);
        let price = prices[prices.len() - 1];
        let bands = bollinger_bands(&prices, p.bollinger_period, p.bollinger_std_dev)?;
        let z = z_score(price, &prices, p.z_score_period)?;
        let volume = volume_profile(bars, p.volume_period)?;
        let volume_confirmed = volume.volume_ratio > p.volume_multiplier;

        let (action, band_distance, band_width) = if price < bands.lower && z < -p.z_score_threshold {
            (SignalAction::Buy, bands.lower - price, bands.middle - bands.lower)
        } else if price > bands.upper && z > p.z_score_threshold {
            (SignalAction::Sell, price - bands.upper, bands.upper - bands.middle)
        } else {
            return Ok(None);
        };

        if !volume_confirmed {
            tracing::debug!(%symbol, ratio = volume.volume_ratio, "band breach without volume confirmation");
            return Ok(None);
        }

        // Outside the band implies sigma > 0, so the band width is positive.
        let z_component = (z.abs() / (2.0 * p.z_score_threshold)).min(1.0);
        let band_component = (band_distance / band_width).min(1.0);
        let volume_component = (volume.volume_ratio / (2.0 * p.volume_multiplier)).min(1.0);
        let confidence = 0.4 * z_component + 0.3 * band_component + 0.3 * volume_component;

        if confidence <= p.min_confidence {
            return Ok(None);
        }

        let fraction = self.position_fraction(z.abs());
        let quantity = shares_for(capital, fraction, bars[bars.len() - 1].close);
        if quantity == 0 {
            return Ok(None);
        }

        let reason = match action {
            SignalAction::Buy => format!(
                "Oversold: price {price:.2} below lower band {:.2}, Z-Score={z:.2}, volume ratio={:.2}x",
                bands.lower, volume.volume_ratio
            ),
            _ => format!(
                "Overbought: price {price:.2} above upper band {:.2}, Z-Score={z:.2}, volume ratio={:.2}x",
                bands.upper, volume.volume_ratio
            ),
        };

        Ok(Some(StrategySignal {
            strategy: StrategyKind::MeanReversion,
            action,
            symbol: symbol.to_string(),
            quantity,
            confidence,
            reason,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bar_series;
    use rust_decimal_macros::dec;

    fn generator() -> MeanReversion {
        MeanReversion::new(MeanReversionParams::default()).unwrap()
    }

    fn flat_then(last_close: f64, last_volume: f64) -> Vec<PriceBar> {
        let mut data = vec![(100.5, 99.5, 100.0, 1000.0); 30];
        data.push((last_close.max(100.0), last_close.min(100.0), last_close, last_volume));
        bar_series(&data)
    }

    #[test]
    fn sharp_drop_on_volume_is_oversold() {
        let signal = generator()
            .evaluate("ACME", &flat_then(90.0, 2000.0), dec!(100000))
            .unwrap()
            .expect("signal");
        assert_eq!(signal.action, SignalAction::Buy);
        assert!(signal.reason.contains("Oversold"));
        assert!(signal.reason.contains("Z-Score"));
        assert!(signal.confidence > 0.5);
        // |Z| ~ 4.36 -> 0.15 + 0.05 * 2.36 = 0.268, capped at 0.25 -> 25000 / 90
        assert_eq!(signal.quantity, 277);
    }

    #[test]
    fn sharp_drop_without_volume_is_ignored() {
        let signal = generator().evaluate("ACME", &flat_then(90.0, 1000.0), dec!(100000)).unwrap();
        assert_eq!(signal, None);
    }

    #[test]
    fn spike_on_volume_is_overbought() {
        let signal = generator()
            .evaluate("ACME", &flat_then(110.0, 2500.0), dec!(100000))
            .unwrap()
            .expect("signal");
        assert_eq!(signal.action, SignalAction::Sell);
        assert!(signal.reason.starts_with("Overbought"));
    }

    #[test]
    fn position_fraction_scales_then_caps() {
        let generator = generator();
        assert_eq!(generator.position_fraction(2.0), dec!(0.15));
        assert_eq!(generator.position_fraction(3.0), dec!(0.20));
        assert_eq!(generator.position_fraction(9.0), dec!(0.25));
    }

    #[test]
    fn needs_twenty_bars() {
        let bars = bar_series(&vec![(100.5, 99.5, 100.0, 1000.0); 19]);
        assert!(generator().evaluate("ACME", &bars, dec!(100000)).is_err());
    }
}
