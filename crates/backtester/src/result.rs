use analytics::{with_opening_equity, AdvancedMetrics, AnalyticsError, DrawdownPoint, EquityPoint, PerformanceReport};
use chrono::NaiveDate;
use configuration::{BacktestSettings, Simulation};
use core_types::{KillSwitchAction, Trade};
use serde::{Deserialize, Serialize};

/// One kill-switch trigger during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillSwitchEvent {
    pub date: NaiveDate,
    pub action: KillSwitchAction,
    pub reason: String,
}

/// Everything a simulation produced. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub settings: BacktestSettings,
    pub simulation: Simulation,
    pub trading_days: usize,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_curve: Vec<DrawdownPoint>,
    pub trades: Vec<Trade>,
    pub summary: PerformanceReport,
    pub kill_switch_events: Vec<KillSwitchEvent>,
    /// The run stopped early on request; curves and trades cover the days processed.
    pub cancelled: bool,
}

impl BacktestResult {
    /// The extended risk-adjusted metrics for this run, measured from the initial capital.
    pub fn advanced_metrics(&self) -> Result<AdvancedMetrics, AnalyticsError> {
        let seeded = with_opening_equity(&self.equity_curve, self.settings.initial_capital);
        AdvancedMetrics::calculate(&self.trades, &seeded)
    }
}
