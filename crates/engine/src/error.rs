use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Aggregator error: {0}")]
    Aggregator(#[from] aggregator::AggregatorError),

    #[error("Risk management error: {0}")]
    Risk(#[from] risk::RiskError),
}
