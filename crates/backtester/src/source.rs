use crate::error::BacktestError;
use aggregator::SignalAggregator;
use chrono::NaiveDate;
use configuration::Config;
use core_types::AggregatedSignal;
use events::EventSink;
use rust_decimal::Decimal;
use std::sync::Arc;
use strategies::{create_enabled, evaluate_batch, SignalGenerator, SymbolBars};

/// The strategy function driven by the simulator once per trading day.
///
/// `history` holds each symbol's trailing bars up to and including `date`;
/// `equity` is the account value at the previous close.
pub trait SignalSource {
    fn signals(&mut self, date: NaiveDate, history: &[SymbolBars<'_>], equity: Decimal) -> Vec<AggregatedSignal>;
}

/// Adapts a closure into a [`SignalSource`].
pub struct FnSignalSource<F>(F);

/// Wraps `f` as a signal source. Scripted strategies in tests are written this way.
pub fn signal_fn<F>(f: F) -> FnSignalSource<F>
where
    F: FnMut(NaiveDate, &[SymbolBars<'_>], Decimal) -> Vec<AggregatedSignal>,
{
    FnSignalSource(f)
}

impl<F> SignalSource for FnSignalSource<F>
where
    F: FnMut(NaiveDate, &[SymbolBars<'_>], Decimal) -> Vec<AggregatedSignal>,
{
    fn signals(&mut self, date: NaiveDate, history: &[SymbolBars<'_>], equity: Decimal) -> Vec<AggregatedSignal> {
        (self.0)(date, history, equity)
    }
}

/// The standard strategy function: every enabled generator over the day's
/// history, merged by the aggregator.
pub struct PipelineSignalSource {
    generators: Vec<Box<dyn SignalGenerator>>,
    aggregator: SignalAggregator,
    capital_fraction: Decimal,
    sink: Arc<dyn EventSink>,
}

impl PipelineSignalSource {
    pub fn new(
        generators: Vec<Box<dyn SignalGenerator>>,
        aggregator: SignalAggregator,
        capital_fraction: Decimal,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            generators,
            aggregator,
            capital_fraction,
            sink,
        }
    }

    pub fn from_config(config: &Config, sink: Arc<dyn EventSink>) -> Result<Self, BacktestError> {
        let generators = create_enabled(config)?;
        let aggregator = SignalAggregator::from_config(&config.aggregation, sink.clone())?;
        Ok(Self::new(
            generators,
            aggregator,
            config.aggregation.strategy_capital_fraction,
            sink,
        ))
    }

    pub fn aggregator_mut(&mut self) -> &mut SignalAggregator {
        &mut self.aggregator
    }
}

impl SignalSource for PipelineSignalSource {
    fn signals(&mut self, date: NaiveDate, history: &[SymbolBars<'_>], equity: Decimal) -> Vec<AggregatedSignal> {
        let capital = equity * self.capital_fraction;
        let signals: Vec<_> = self
            .generators
            .iter()
            .flat_map(|generator| evaluate_batch(generator.as_ref(), history, capital, self.sink.as_ref()))
            .collect();
        tracing::debug!(%date, raw = signals.len(), "strategy signals generated");
        self.aggregator.aggregate(&signals)
    }
}
