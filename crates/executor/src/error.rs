use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    #[error("Not enough cash available to execute trade. Required: {required}, Available: {available}")]
    InsufficientCash { required: Decimal, available: Decimal },

    #[error("Position not found for symbol: {0}")]
    PositionNotFound(String),

    #[error("A position is already open for symbol: {0}")]
    PositionAlreadyOpen(String),

    #[error("Invalid order quantity {quantity} at reference price {price}")]
    InvalidQuantity { quantity: u64, price: Decimal },
}
