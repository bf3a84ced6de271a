//! # Vantage Signal Engine
//!
//! Runs one live evaluation cycle over the configured universe: fetch bars,
//! generate, aggregate, check the kill switches and size the resulting buys.
//! No orders are routed anywhere; the [`CycleReport`] goes back to the caller.

use aggregator::{detect_market_regime, RegimeAssessment, SignalAggregator};
use chrono::{Duration, NaiveDate};
use configuration::Config;
use core_types::{PriceBar, Position, SignalAction};
use events::{EngineEvent, EventSink, SkipStage};
use market_data::{fetch_all, MarketDataProvider};
use risk::{atr_for_stops, review_buy, LimitRiskManager, RiskManager};
use std::sync::Arc;
use strategies::{create_enabled, evaluate_batch, SignalGenerator, SymbolBars};

pub mod error;
pub mod report;

pub use error::EngineError;
pub use report::{CycleReport, PortfolioSnapshot};

/// Calendar days fetched per requested bar, leaving room for weekends and holidays.
const CALENDAR_DAYS_PER_BAR: i64 = 2;

/// The central orchestrator for one evaluation cycle.
pub struct SignalEngine {
    config: Config,
    provider: Arc<dyn MarketDataProvider>,
    generators: Vec<Box<dyn SignalGenerator>>,
    aggregator: SignalAggregator,
    risk_manager: Arc<dyn RiskManager>,
    sink: Arc<dyn EventSink>,
}

impl SignalEngine {
    pub fn new(
        config: Config,
        provider: Arc<dyn MarketDataProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        if config.backtest.symbols.is_empty() {
            return Err(EngineError::Configuration("no symbols configured".to_string()));
        }
        let generators = create_enabled(&config)?;
        let aggregator = SignalAggregator::from_config(&config.aggregation, sink.clone())?;
        let risk_manager = Arc::new(LimitRiskManager::new(
            config.risk_limits.clone(),
            config.sizing.clone(),
        )?);
        Ok(Self {
            config,
            provider,
            generators,
            aggregator,
            risk_manager,
            sink,
        })
    }

    /// Switches the aggregator to the weights recommended for the given regime.
    pub fn apply_regime(&mut self, volatility_index: f64, trend_strength: f64) -> Result<RegimeAssessment, EngineError> {
        let assessment = detect_market_regime(volatility_index, trend_strength);
        self.aggregator.set_weights(assessment.weights)?;
        tracing::info!(regime = %assessment.regime, "strategy weights updated for market regime");
        Ok(assessment)
    }

    /// Runs one cycle for the bars up to and including `as_of`.
    ///
    /// The kill switches are checked before anything else. A trigger is reported
    /// in the result and suppresses every new order; signals are still generated
    /// so the caller can see what was withheld.
    pub async fn run_cycle(&self, as_of: NaiveDate, portfolio: &PortfolioSnapshot) -> Result<CycleReport, EngineError> {
        let kill_switch = self.risk_manager.check_kill_switches(&portfolio.status);
        if kill_switch.triggered {
            tracing::warn!(action = %kill_switch.action, reason = %kill_switch.reason, "kill switch triggered");
            self.sink.emit(EngineEvent::KillSwitchTriggered {
                date: Some(as_of),
                action: kill_switch.action,
                reason: kill_switch.reason.clone(),
            });
        }

        let (universe, skipped_symbols) = self.fetch_universe(as_of).await;
        let history: Vec<SymbolBars<'_>> = universe
            .iter()
            .map(|(symbol, bars)| (symbol.as_str(), bars.as_slice()))
            .collect();

        let capital = portfolio.status.total_value;
        let allocated = capital * self.config.aggregation.strategy_capital_fraction;
        let signals: Vec<_> = self
            .generators
            .iter()
            .flat_map(|generator| evaluate_batch(generator.as_ref(), &history, allocated, self.sink.as_ref()))
            .collect();
        let decisions = self.aggregator.aggregate(&signals);

        let mut report = CycleReport {
            as_of,
            skipped_symbols,
            signals,
            decisions: Vec::new(),
            orders: Vec::new(),
            exits: Vec::new(),
            kill_switch: None,
        };
        if kill_switch.triggered {
            report.decisions = decisions;
            report.kill_switch = Some(kill_switch);
            return Ok(report);
        }

        // Orders approved earlier in the cycle count towards exposure for later ones.
        let mut positions = portfolio.positions.clone();
        for decision in &decisions {
            match decision.action {
                SignalAction::Buy => {
                    let Some(bars) = history.iter().find(|(s, _)| *s == decision.symbol).map(|(_, b)| *b) else {
                        continue;
                    };
                    let Some(last) = bars.last() else {
                        continue;
                    };
                    let atr = atr_for_stops(bars, self.risk_manager.limits()).ok();
                    match review_buy(
                        self.risk_manager.as_ref(),
                        self.sink.as_ref(),
                        &decision.symbol,
                        decision.quantity,
                        last.close,
                        capital,
                        &positions,
                        atr,
                    ) {
                        Ok(Some(order)) => {
                            positions.push(Position {
                                symbol: order.symbol.clone(),
                                quantity: order.quantity,
                                entry_price: order.price,
                                current_price: order.price,
                            });
                            report.orders.push(order);
                        }
                        Ok(None) => {}
                        Err(e) => self.sink.emit(EngineEvent::SymbolSkipped {
                            symbol: decision.symbol.clone(),
                            stage: SkipStage::Risk,
                            reason: e.to_string(),
                        }),
                    }
                }
                SignalAction::Sell if portfolio.positions.iter().any(|p| p.symbol == decision.symbol) => {
                    report.exits.push(decision.clone());
                }
                SignalAction::Sell | SignalAction::Hold => {}
            }
        }
        report.decisions = decisions;

        tracing::info!(
            %as_of,
            signals = report.signals.len(),
            orders = report.orders.len(),
            exits = report.exits.len(),
            skipped = report.skipped_symbols.len(),
            "evaluation cycle complete"
        );
        Ok(report)
    }

    /// Fetches every configured symbol concurrently and trims each series to the
    /// lookback. Returns the usable series and the symbols that failed.
    async fn fetch_universe(&self, as_of: NaiveDate) -> (Vec<(String, Vec<PriceBar>)>, Vec<String>) {
        let lookback = self.config.backtest.lookback_bars;
        let start = as_of - Duration::days(lookback as i64 * CALENDAR_DAYS_PER_BAR);
        let outcomes = fetch_all(
            self.provider.as_ref(),
            &self.config.backtest.symbols,
            &self.config.market_data.timeframe,
            start,
            as_of,
        )
        .await;

        let mut universe = Vec::new();
        let mut skipped = Vec::new();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(mut bars) if !bars.is_empty() => {
                    let excess = bars.len().saturating_sub(lookback);
                    bars.drain(..excess);
                    universe.push((symbol, bars));
                }
                Ok(_) => {
                    self.report_fetch_failure(&symbol, "no bars in range");
                    skipped.push(symbol);
                }
                Err(e) => {
                    self.report_fetch_failure(&symbol, &e.to_string());
                    skipped.push(symbol);
                }
            }
        }
        (universe, skipped)
    }

    fn report_fetch_failure(&self, symbol: &str, reason: &str) {
        self.sink.emit(EngineEvent::SymbolSkipped {
            symbol: symbol.to_string(),
            stage: SkipStage::Fetch,
            reason: reason.to_string(),
        });
    }
}
