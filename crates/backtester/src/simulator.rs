use crate::cancel::CancelHandle;
use crate::error::BacktestError;
use crate::history::{bar_on, trading_days, window, HistoricalData};
use crate::result::{BacktestResult, KillSwitchEvent};
use crate::source::SignalSource;
use analytics::{drawdown_curve, with_opening_equity, EquityPoint, PerformanceReport};
use chrono::NaiveDate;
use configuration::Config;
use core_types::{AggregatedSignal, ExitReason, KillSwitchAction, OrderSide, PortfolioStatus, PriceBar, SignalAction, Trade};
use events::{EngineEvent, EventSink};
use executor::{Executor, ExecutorError, Portfolio, SimulatedExecutor};
use indicatif::{ProgressBar, ProgressStyle};
use risk::{atr_for_stops, review_buy, LimitRiskManager, RiskManager};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use strategies::SymbolBars;

/// Mutable state of one run. Days are strictly sequential: each one starts
/// from the previous day's cash, positions, stops and high-water mark.
struct RunState {
    portfolio: Portfolio,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    kill_switch_events: Vec<KillSwitchEvent>,
    high_water_mark: Decimal,
    previous_equity: Decimal,
    /// Set by a liquidation; no entries for the rest of the run.
    halted: bool,
}

/// The day-by-day backtest simulator.
pub struct Backtester {
    config: Config,
    risk_manager: Box<dyn RiskManager>,
    executor: Box<dyn Executor>,
    sink: Arc<dyn EventSink>,
    cancel: CancelHandle,
}

impl Backtester {
    /// Builds a simulator with the standard risk manager and simulated executor.
    pub fn new(config: Config, sink: Arc<dyn EventSink>) -> Result<Self, BacktestError> {
        let risk_manager = LimitRiskManager::new(config.risk_limits.clone(), config.sizing.clone())?;
        let executor = SimulatedExecutor::new(config.simulation.clone());
        Ok(Self::with_components(config, Box::new(risk_manager), Box::new(executor), sink))
    }

    pub fn with_components(
        config: Config,
        risk_manager: Box<dyn RiskManager>,
        executor: Box<dyn Executor>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            risk_manager,
            executor,
            sink,
            cancel: CancelHandle::new(),
        }
    }

    /// A handle that stops the run before its next trading day.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Replays `data` day by day through `source`.
    ///
    /// Per day: stop-loss / take-profit exits against the bar's range, trailing
    /// stops, kill switches (when enabled), then the day's signals, then the
    /// day-end equity. Positions still open after the last processed day are
    /// closed at their last close.
    pub fn run(&self, data: &HistoricalData, source: &mut dyn SignalSource) -> Result<BacktestResult, BacktestError> {
        let settings = &self.config.backtest;
        let days = trading_days(data, settings.start_date, settings.end_date);
        if days.is_empty() {
            return Err(BacktestError::DataUnavailable);
        }
        tracing::info!(
            symbols = data.len(),
            trading_days = days.len(),
            capital = %settings.initial_capital,
            "starting backtest"
        );

        let progress = self.progress_bar(days.len())?;
        let mut state = RunState {
            portfolio: Portfolio::new(settings.initial_capital),
            trades: Vec::new(),
            equity_curve: Vec::with_capacity(days.len()),
            kill_switch_events: Vec::new(),
            high_water_mark: settings.initial_capital,
            previous_equity: settings.initial_capital,
            halted: false,
        };

        let mut cancelled = false;
        let mut last_day = None;
        for &date in &days {
            if self.cancel.is_cancelled() {
                tracing::warn!(%date, "backtest cancelled");
                self.sink.emit(EngineEvent::BacktestCancelled { date });
                cancelled = true;
                break;
            }
            self.simulate_day(date, data, source, &mut state)?;
            last_day = Some(date);
            progress.inc(1);
        }

        if let Some(date) = last_day {
            self.close_all(&mut state, date, ExitReason::EndOfBacktest)?;
            let final_equity = state.portfolio.equity();
            if let Some(last) = state.equity_curve.last_mut() {
                last.equity = final_equity;
            }
        }
        progress.finish_with_message("Simulation complete.");

        let summary = PerformanceReport::calculate(&state.trades, &state.equity_curve, settings.initial_capital)?;
        self.sink.emit(EngineEvent::BacktestCompleted {
            trading_days: state.equity_curve.len(),
            total_trades: state.trades.len(),
            final_equity: summary.final_equity,
        });

        // The opening balance is the first peak; its own point is not part of the run.
        let drawdowns = drawdown_curve(&with_opening_equity(&state.equity_curve, settings.initial_capital))
            .into_iter()
            .skip(1)
            .collect();

        Ok(BacktestResult {
            settings: settings.clone(),
            simulation: self.config.simulation.clone(),
            trading_days: state.equity_curve.len(),
            drawdown_curve: drawdowns,
            equity_curve: state.equity_curve,
            trades: state.trades,
            summary,
            kill_switch_events: state.kill_switch_events,
            cancelled,
        })
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, BacktestError> {
        if !self.config.backtest.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress = ProgressBar::new(len as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} days ({eta})")?
                .progress_chars("=>-"),
        );
        Ok(progress)
    }

    fn simulate_day(
        &self,
        date: NaiveDate,
        data: &HistoricalData,
        source: &mut dyn SignalSource,
        state: &mut RunState,
    ) -> Result<(), BacktestError> {
        let today: BTreeMap<&str, &PriceBar> = data
            .iter()
            .filter_map(|(symbol, bars)| bar_on(bars, date).map(|bar| (symbol.as_str(), bar)))
            .collect();

        self.process_exits(date, &today, state)?;

        for (symbol, bar) in &today {
            state.portfolio.mark(symbol, bar.close);
        }
        self.ratchet_trailing_stops(date, &today, state);

        let paused = self.evaluate_kill_switches(date, state)?;

        if !state.halted {
            let lookback = self.config.backtest.lookback_bars;
            let history: Vec<SymbolBars<'_>> = data
                .iter()
                .map(|(symbol, bars)| (symbol.as_str(), window(bars, date, lookback)))
                .filter(|(_, bars)| !bars.is_empty())
                .collect();
            let signals = source.signals(date, &history, state.previous_equity);
            // Exits release cash, exposure and position slots for the day's entries.
            let (sells, entries): (Vec<_>, Vec<_>) =
                signals.iter().partition(|signal| signal.action == SignalAction::Sell);
            for signal in sells.into_iter().chain(entries) {
                let Some(bar) = today.get(signal.symbol.as_str()) else {
                    continue;
                };
                match signal.action {
                    SignalAction::Sell => {
                        if state.portfolio.has_position(&signal.symbol) {
                            self.close_position(state, &signal.symbol, bar.close, date, ExitReason::Signal)?;
                        }
                    }
                    SignalAction::Buy if paused => {
                        self.skip_order(date, &signal.symbol, "new entries paused by kill switch");
                    }
                    SignalAction::Buy => {
                        let bars = history
                            .iter()
                            .find(|(symbol, _)| *symbol == signal.symbol)
                            .map(|(_, bars)| *bars)
                            .unwrap_or_default();
                        self.enter(date, signal, bar, bars, state)?;
                    }
                    SignalAction::Hold => {}
                }
            }
        }

        let equity = state.portfolio.equity();
        state.high_water_mark = state.high_water_mark.max(equity);
        state.previous_equity = equity;
        state.equity_curve.push(EquityPoint { date, equity });
        Ok(())
    }

    /// Stop-loss against the day's low, then take-profit against its high. When a
    /// bar breaches both, the stop-loss wins.
    fn process_exits(
        &self,
        date: NaiveDate,
        today: &BTreeMap<&str, &PriceBar>,
        state: &mut RunState,
    ) -> Result<(), BacktestError> {
        for symbol in state.portfolio.symbols() {
            let (Some(bar), Some(position)) = (today.get(symbol.as_str()), state.portfolio.position(&symbol)) else {
                continue;
            };
            let stop_hit = position.stop_loss.filter(|stop| bar.low <= *stop);
            let target_hit = position.take_profit.filter(|target| bar.high >= *target);
            let exit = match (stop_hit, target_hit) {
                (Some(stop), _) => Some((stop, ExitReason::StopLoss)),
                (None, Some(target)) => Some((target, ExitReason::TakeProfit)),
                (None, None) => None,
            };
            if let Some((price, reason)) = exit {
                self.close_position(state, &symbol, price, date, reason)?;
            }
        }
        Ok(())
    }

    fn ratchet_trailing_stops(&self, date: NaiveDate, today: &BTreeMap<&str, &PriceBar>, state: &mut RunState) {
        for symbol in state.portfolio.symbols() {
            if !today.contains_key(symbol.as_str()) {
                continue;
            }
            let Some(position) = state.portfolio.position_mut(&symbol) else {
                continue;
            };
            let Some(stop) = position.stop_loss else {
                continue;
            };
            let raised = self
                .risk_manager
                .update_trailing_stop(position.last_price, position.highest_price, stop);
            if raised > stop {
                position.stop_loss = Some(raised);
                self.sink.emit(EngineEvent::TrailingStopRaised {
                    date,
                    symbol,
                    from: stop,
                    to: raised,
                });
            }
        }
    }

    /// Returns whether new entries are paused for the day. A liquidation closes
    /// everything and halts the run.
    fn evaluate_kill_switches(&self, date: NaiveDate, state: &mut RunState) -> Result<bool, BacktestError> {
        if !self.config.backtest.enforce_kill_switches || state.halted {
            return Ok(false);
        }
        let status = PortfolioStatus::from_values(
            state.portfolio.equity(),
            state.previous_equity,
            state.high_water_mark,
        );
        let decision = self.risk_manager.check_kill_switches(&status);
        if !decision.triggered {
            return Ok(false);
        }

        tracing::warn!(%date, action = %decision.action, reason = %decision.reason, "kill switch triggered");
        self.sink.emit(EngineEvent::KillSwitchTriggered {
            date: Some(date),
            action: decision.action,
            reason: decision.reason.clone(),
        });
        state.kill_switch_events.push(KillSwitchEvent {
            date,
            action: decision.action,
            reason: decision.reason,
        });

        match decision.action {
            KillSwitchAction::Continue => Ok(false),
            KillSwitchAction::Pause => Ok(true),
            KillSwitchAction::Liquidate => {
                self.close_all(state, date, ExitReason::Liquidation)?;
                state.halted = true;
                Ok(true)
            }
        }
    }

    fn enter(
        &self,
        date: NaiveDate,
        signal: &AggregatedSignal,
        bar: &PriceBar,
        history: &[PriceBar],
        state: &mut RunState,
    ) -> Result<(), BacktestError> {
        let symbol = signal.symbol.as_str();
        if state.portfolio.has_position(symbol) {
            self.skip_order(date, symbol, "position already open");
            return Ok(());
        }

        let atr = atr_for_stops(history, self.risk_manager.limits()).ok();
        let reviewed = match review_buy(
            self.risk_manager.as_ref(),
            self.sink.as_ref(),
            symbol,
            signal.quantity,
            bar.close,
            state.portfolio.equity(),
            &state.portfolio.risk_positions(),
            atr,
        ) {
            Ok(Some(order)) => order,
            Ok(None) => return Ok(()),
            Err(e) => {
                self.skip_order(date, symbol, &e.to_string());
                return Ok(());
            }
        };

        let fill = self.executor.execute(symbol, OrderSide::Buy, reviewed.quantity, bar.close)?;
        let stop_loss = reviewed.stops.map(|s| s.stop_loss);
        let take_profit = reviewed.stops.map(|s| s.take_profit);
        match state.portfolio.open(&fill, date, stop_loss, take_profit) {
            Ok(position) => {
                tracing::debug!(%date, %symbol, quantity = position.quantity, price = %position.entry_price, "position opened");
                self.sink.emit(EngineEvent::PositionOpened {
                    date,
                    symbol: symbol.to_string(),
                    quantity: position.quantity,
                    price: position.entry_price,
                    stop_loss,
                    take_profit,
                });
                Ok(())
            }
            Err(e @ ExecutorError::InsufficientCash { .. }) => {
                self.skip_order(date, symbol, &e.to_string());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn skip_order(&self, date: NaiveDate, symbol: &str, reason: &str) {
        tracing::warn!(%date, %symbol, %reason, "order skipped");
        self.sink.emit(EngineEvent::OrderSkipped {
            date,
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        });
    }

    fn close_position(
        &self,
        state: &mut RunState,
        symbol: &str,
        reference_price: Decimal,
        date: NaiveDate,
        reason: ExitReason,
    ) -> Result<(), BacktestError> {
        let quantity = state
            .portfolio
            .position(symbol)
            .map(|p| p.quantity)
            .ok_or_else(|| ExecutorError::PositionNotFound(symbol.to_string()))?;
        let fill = self.executor.execute(symbol, OrderSide::Sell, quantity, reference_price)?;
        let trade = state.portfolio.close(&fill, date, reason)?;
        tracing::debug!(%date, %symbol, pnl = %trade.pnl, %reason, "position closed");
        self.sink.emit(EngineEvent::TradeClosed(trade.clone()));
        state.trades.push(trade);
        Ok(())
    }

    /// Closes every open position at its last marked price.
    fn close_all(&self, state: &mut RunState, date: NaiveDate, reason: ExitReason) -> Result<(), BacktestError> {
        let open: Vec<(String, Decimal)> = state
            .portfolio
            .positions()
            .map(|p| (p.symbol.clone(), p.last_price))
            .collect();
        for (symbol, price) in open {
            self.close_position(state, &symbol, price, date, reason)?;
        }
        Ok(())
    }
}
