use crate::breakout::Breakout;
use crate::error::StrategyError;
use crate::mean_reversion::MeanReversion;
use crate::momentum::Momentum;
use crate::SignalGenerator;
use configuration::Config;
use core_types::StrategyKind;

/// Creates a generator for `kind` from its section of the configuration.
pub fn create_generator(
    kind: StrategyKind,
    config: &Config,
) -> Result<Box<dyn SignalGenerator>, StrategyError> {
    // The compiler will error here if a new StrategyKind is added but not handled.
    match kind {
        StrategyKind::Momentum => Ok(Box::new(Momentum::new(config.strategies.momentum.clone())?)),
        StrategyKind::MeanReversion => Ok(Box::new(MeanReversion::new(
            config.strategies.mean_reversion.clone(),
        )?)),
        StrategyKind::Breakout => Ok(Box::new(Breakout::new(config.strategies.breakout.clone())?)),
    }
}

/// Creates every generator listed in `aggregation.enabled_strategies`, in
/// canonical order and without duplicates.
pub fn create_enabled(config: &Config) -> Result<Vec<Box<dyn SignalGenerator>>, StrategyError> {
    let enabled = &config.aggregation.enabled_strategies;
    if enabled.is_empty() {
        return Err(StrategyError::StrategyNotFound("no strategies enabled".to_string()));
    }
    StrategyKind::ALL
        .into_iter()
        .filter(|kind| enabled.contains(kind))
        .map(|kind| create_generator(kind, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_each_kind() {
        let config = Config::default();
        for kind in StrategyKind::ALL {
            assert_eq!(create_generator(kind, &config).unwrap().kind(), kind);
        }
    }

    #[test]
    fn enabled_list_is_deduplicated_and_ordered() {
        let mut config = Config::default();
        config.aggregation.enabled_strategies = vec![
            StrategyKind::Breakout,
            StrategyKind::Momentum,
            StrategyKind::Breakout,
        ];
        let kinds: Vec<_> = create_enabled(&config).unwrap().iter().map(|g| g.kind()).collect();
        assert_eq!(kinds, vec![StrategyKind::Momentum, StrategyKind::Breakout]);
    }

    #[test]
    fn invalid_section_fails_construction() {
        let mut config = Config::default();
        config.strategies.breakout.atr_period = 0;
        assert!(matches!(
            create_generator(StrategyKind::Breakout, &config),
            Err(StrategyError::InvalidParameters(_))
        ));
    }

    #[test]
    fn nothing_enabled_is_an_error() {
        let mut config = Config::default();
        config.aggregation.enabled_strategies.clear();
        assert!(matches!(create_enabled(&config), Err(StrategyError::StrategyNotFound(_))));
    }
}
