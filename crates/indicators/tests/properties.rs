use indicators::{bollinger_bands, ema, rsi, sma, z_score};
use proptest::prelude::*;

fn price_series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, 30..120)
}

proptest! {
    #[test]
    fn rsi_stays_within_bounds(prices in price_series()) {
        let value = rsi(&prices, 14).unwrap();
        prop_assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn bollinger_bands_are_ordered(prices in price_series(), mult in 0.5f64..4.0) {
        let bands = bollinger_bands(&prices, 20, mult).unwrap();
        prop_assert!(bands.upper >= bands.middle);
        prop_assert!(bands.middle >= bands.lower);
        prop_assert!(bands.bandwidth >= 0.0);
    }

    #[test]
    fn moving_averages_stay_within_price_range(prices in price_series()) {
        let lo = prices.iter().cloned().fold(f64::MAX, f64::min);
        let hi = prices.iter().cloned().fold(f64::MIN, f64::max);
        for value in [sma(&prices, 20).unwrap(), ema(&prices, 20).unwrap()] {
            prop_assert!(value >= lo - 1e-9 && value <= hi + 1e-9);
        }
    }

    #[test]
    fn z_score_sign_follows_distance_from_mean(prices in price_series()) {
        let mean = sma(&prices, 20).unwrap();
        let current = prices[prices.len() - 1];
        let z = z_score(current, &prices, 20).unwrap();
        if current > mean + 1e-9 {
            prop_assert!(z >= 0.0);
        } else if current < mean - 1e-9 {
            prop_assert!(z <= 0.0);
        }
    }
}

#[test]
fn steadily_rising_prices_have_high_rsi() {
    let prices: Vec<f64> = (0..60)
        .map(|i| 100.0 + i as f64 + if i % 5 == 0 { -0.3 } else { 0.0 })
        .collect();
    assert!(rsi(&prices, 14).unwrap() > 90.0);
}

#[test]
fn steadily_falling_prices_have_low_rsi() {
    let prices: Vec<f64> = (0..60)
        .map(|i| 200.0 - i as f64 + if i % 5 == 0 { 0.3 } else { 0.0 })
        .collect();
    assert!(rsi(&prices, 14).unwrap() < 10.0);
}
