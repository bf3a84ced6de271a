use chrono::{Duration, TimeZone, Utc};
use configuration::Config;
use core_types::{PriceBar, SignalAction, StrategyKind};
use events::{EngineEvent, MemorySink};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use strategies::{create_generator, evaluate_batch, SymbolBars};

fn bars(data: &[(f64, f64, f64, f64)]) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(high, low, close, volume))| {
            PriceBar::new(
                start + Duration::days(i as i64),
                Decimal::from_f64(close).unwrap(),
                Decimal::from_f64(high).unwrap(),
                Decimal::from_f64(low).unwrap(),
                Decimal::from_f64(close).unwrap(),
                Decimal::from_f64(volume).unwrap(),
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn rising_market_produces_exactly_one_momentum_buy() {
    let data: Vec<_> = (0..50)
        .map(|i| {
            let c = 100.0 * 1.01f64.powi(i);
            (c * 1.005, c * 0.995, c, 1_000.0 + 50.0 * i as f64)
        })
        .collect();
    let series = bars(&data);
    let universe: Vec<SymbolBars<'_>> = vec![("TREND", series.as_slice())];

    let generator = create_generator(StrategyKind::Momentum, &Config::default()).unwrap();
    let sink = MemorySink::new();
    let signals = evaluate_batch(generator.as_ref(), &universe, dec!(50000), &sink);

    assert_eq!(signals.len(), 1);
    let signal = &signals[0];
    assert_eq!(signal.action, SignalAction::Buy);
    assert!(signal.confidence > 0.5);
    assert!(signal.reason.contains("Momentum"));
    assert_eq!(sink.count(|e| matches!(e, EngineEvent::SignalGenerated(_))), 1);
}

fn flat_then_drop(drop_volume: f64) -> Vec<PriceBar> {
    let mut data = vec![(100.5, 99.5, 100.0, 1_000.0); 30];
    data.push((100.0, 89.0, 90.0, drop_volume));
    bars(&data)
}

#[test]
fn sharp_drop_on_double_volume_is_an_oversold_buy() {
    let series = flat_then_drop(2_000.0);
    let universe: Vec<SymbolBars<'_>> = vec![("DIP", series.as_slice())];
    let generator = create_generator(StrategyKind::MeanReversion, &Config::default()).unwrap();

    let signals = evaluate_batch(generator.as_ref(), &universe, dec!(50000), &MemorySink::new());
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].action, SignalAction::Buy);
    assert!(signals[0].reason.contains("Oversold"));
    assert!(signals[0].reason.contains("Z-Score"));
}

#[test]
fn sharp_drop_on_flat_volume_is_ignored() {
    let series = flat_then_drop(1_000.0);
    let universe: Vec<SymbolBars<'_>> = vec![("DIP", series.as_slice())];
    let generator = create_generator(StrategyKind::MeanReversion, &Config::default()).unwrap();

    let signals = evaluate_batch(generator.as_ref(), &universe, dec!(50000), &MemorySink::new());
    assert!(signals.is_empty());
}
