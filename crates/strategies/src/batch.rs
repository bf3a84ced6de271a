use crate::SignalGenerator;
use core_types::{PriceBar, StrategySignal};
use events::{EngineEvent, EventSink, SkipStage};
use rayon::prelude::*;
use rust_decimal::Decimal;

/// One symbol's bar history, oldest first.
pub type SymbolBars<'a> = (&'a str, &'a [PriceBar]);

/// Evaluates `generator` over every symbol in parallel.
///
/// A failing symbol (short history, degenerate data) is reported through `sink`
/// as [`EngineEvent::SymbolSkipped`] and never aborts the rest of the batch.
/// Signals come back in the order of `universe`.
pub fn evaluate_batch(
    generator: &dyn SignalGenerator,
    universe: &[SymbolBars<'_>],
    capital: Decimal,
    sink: &dyn EventSink,
) -> Vec<StrategySignal> {
    let outcomes: Vec<_> = universe
        .par_iter()
        .map(|(symbol, bars)| (*symbol, generator.evaluate(symbol, bars, capital)))
        .collect();

    let mut signals = Vec::new();
    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(Some(signal)) => {
                sink.emit(EngineEvent::SignalGenerated(signal.clone()));
                signals.push(signal);
            }
            Ok(None) => {}
            Err(e) => sink.emit(EngineEvent::SymbolSkipped {
                symbol: symbol.to_string(),
                stage: SkipStage::Strategy(generator.kind()),
                reason: e.to_string(),
            }),
        }
    }
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mean_reversion::MeanReversion;
    use crate::test_support::bar_series;
    use configuration::MeanReversionParams;
    use events::MemorySink;
    use rust_decimal_macros::dec;

    #[test]
    fn failing_symbol_does_not_abort_batch() {
        let mut oversold = vec![(100.5, 99.5, 100.0, 1000.0); 30];
        oversold.push((100.0, 90.0, 90.0, 2000.0));
        let oversold = bar_series(&oversold);
        let short = bar_series(&[(100.5, 99.5, 100.0, 1000.0); 5]);
        let quiet = bar_series(&vec![(100.5, 99.5, 100.0, 1000.0); 30]);

        let universe: Vec<SymbolBars<'_>> = vec![
            ("SHORT", short.as_slice()),
            ("DIP", oversold.as_slice()),
            ("QUIET", quiet.as_slice()),
        ];
        let generator = MeanReversion::new(MeanReversionParams::default()).unwrap();
        let sink = MemorySink::new();

        let signals = evaluate_batch(&generator, &universe, dec!(100000), &sink);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].symbol, "DIP");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            EngineEvent::SymbolSkipped { symbol, stage: SkipStage::Strategy(_), .. } if symbol == "SHORT"
        ));
        assert!(matches!(&events[1], EngineEvent::SignalGenerated(s) if s.symbol == "DIP"));
    }
}
