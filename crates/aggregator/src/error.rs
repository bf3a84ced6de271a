use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregatorError {
    #[error("Invalid strategy weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid minimum confidence {0}: must be within [0, 1]")]
    InvalidMinConfidence(f64),
}
