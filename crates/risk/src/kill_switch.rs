use configuration::RiskLimits;
use core_types::{KillSwitchAction, PortfolioStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillSwitchDecision {
    pub triggered: bool,
    pub action: KillSwitchAction,
    pub reason: String,
}

/// Evaluates the portfolio-level circuit breakers.
///
/// The daily-loss limit is checked first (`|daily_pnl_percent| >= max_daily_loss`
/// pauses trading), then the drawdown limit (`current_drawdown >= max_drawdown`
/// liquidates). Only the first match is reported.
pub fn check_kill_switches(status: &PortfolioStatus, limits: &RiskLimits) -> KillSwitchDecision {
    if status.daily_pnl_percent.abs() >= limits.max_daily_loss_pct {
        return KillSwitchDecision {
            triggered: true,
            action: KillSwitchAction::Pause,
            reason: format!(
                "daily P&L {} breaches the {} daily loss limit",
                status.daily_pnl_percent, limits.max_daily_loss_pct
            ),
        };
    }
    if status.current_drawdown >= limits.max_drawdown_pct {
        return KillSwitchDecision {
            triggered: true,
            action: KillSwitchAction::Liquidate,
            reason: format!(
                "drawdown {} from high-water mark {} breaches the {} limit",
                status.current_drawdown, status.high_water_mark, limits.max_drawdown_pct
            ),
        };
    }
    KillSwitchDecision {
        triggered: false,
        action: KillSwitchAction::Continue,
        reason: "within limits".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn status(daily: Decimal, drawdown: Decimal) -> PortfolioStatus {
        PortfolioStatus {
            total_value: dec!(100000),
            daily_pnl: dec!(100000) * daily,
            daily_pnl_percent: daily,
            current_drawdown: drawdown,
            high_water_mark: dec!(110000),
        }
    }

    #[test]
    fn daily_loss_pauses() {
        let decision = check_kill_switches(&status(dec!(-0.03), dec!(0)), &RiskLimits::default());
        assert!(decision.triggered);
        assert_eq!(decision.action, KillSwitchAction::Pause);
    }

    #[test]
    fn drawdown_liquidates() {
        let decision = check_kill_switches(&status(dec!(0), dec!(0.16)), &RiskLimits::default());
        assert!(decision.triggered);
        assert_eq!(decision.action, KillSwitchAction::Liquidate);
    }

    #[test]
    fn daily_loss_is_checked_before_drawdown() {
        let decision = check_kill_switches(&status(dec!(-0.05), dec!(0.20)), &RiskLimits::default());
        assert_eq!(decision.action, KillSwitchAction::Pause);
    }

    #[test]
    fn large_daily_gain_also_pauses() {
        // The limit is applied to the magnitude of the daily move.
        let decision = check_kill_switches(&status(dec!(0.04), dec!(0)), &RiskLimits::default());
        assert_eq!(decision.action, KillSwitchAction::Pause);
    }

    #[test]
    fn healthy_portfolio_continues() {
        let decision = check_kill_switches(&status(dec!(-0.01), dec!(0.05)), &RiskLimits::default());
        assert!(!decision.triggered);
        assert_eq!(decision.action, KillSwitchAction::Continue);
    }
}
