use chrono::NaiveDate;
use core_types::{AggregatedSignal, PortfolioStatus, Position, StrategySignal};
use risk::{KillSwitchDecision, ReviewedOrder};

/// The portfolio collaborator's view of the account at the start of a cycle.
#[derive(Debug, Clone)]
pub struct PortfolioSnapshot {
    pub status: PortfolioStatus,
    pub positions: Vec<Position>,
}

impl PortfolioSnapshot {
    /// A flat account holding only cash.
    pub fn flat(capital: rust_decimal::Decimal) -> Self {
        Self {
            status: PortfolioStatus::from_values(capital, capital, capital),
            positions: Vec::new(),
        }
    }
}

/// What one evaluation cycle decided.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub as_of: NaiveDate,
    /// Symbols whose bars could not be fetched.
    pub skipped_symbols: Vec<String>,
    pub signals: Vec<StrategySignal>,
    pub decisions: Vec<AggregatedSignal>,
    /// Buys that passed risk review, with their protective stops.
    pub orders: Vec<ReviewedOrder>,
    /// Sell decisions for symbols currently held.
    pub exits: Vec<AggregatedSignal>,
    /// Set when a kill switch fired; no orders are produced in that case.
    pub kill_switch: Option<KillSwitchDecision>,
}

impl CycleReport {
    pub fn is_halted(&self) -> bool {
        self.kill_switch.as_ref().is_some_and(|d| d.triggered)
    }
}
