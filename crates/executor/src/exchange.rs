use crate::error::ExecutorError;
use configuration::Simulation;
use core_types::OrderSide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The effect of one simulated order leg. Carries the costs but does not
/// touch any account state; [`crate::Portfolio`] applies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    /// The price before slippage.
    pub reference_price: Decimal,
    pub price: Decimal,
    pub commission: Decimal,
    /// `|price - reference_price| * quantity`.
    pub slippage_cost: Decimal,
}

impl Fill {
    /// Notional value at the fill price, excluding commission.
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Turns an order into a fill. Kept as a trait so the simulator does not care
/// how prices and costs are modelled.
pub trait Executor: Send + Sync {
    fn execute(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: u64,
        reference_price: Decimal,
    ) -> Result<Fill, ExecutorError>;
}

/// The "virtual exchange" for backtesting.
///
/// Slippage is a fixed fraction of the reference price and always adverse:
/// buys fill at `price * (1 + s)`, sells at `price * (1 - s)`. A flat
/// commission is charged on every leg.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    params: Simulation,
}

impl SimulatedExecutor {
    pub fn new(params: Simulation) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Simulation {
        &self.params
    }

    fn slipped_price(&self, side: OrderSide, reference_price: Decimal) -> Decimal {
        match side {
            OrderSide::Buy => reference_price * (Decimal::ONE + self.params.slippage_pct),
            OrderSide::Sell => reference_price * (Decimal::ONE - self.params.slippage_pct),
        }
    }
}

impl Executor for SimulatedExecutor {
    fn execute(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: u64,
        reference_price: Decimal,
    ) -> Result<Fill, ExecutorError> {
        if quantity == 0 || reference_price <= Decimal::ZERO {
            return Err(ExecutorError::InvalidQuantity {
                quantity,
                price: reference_price,
            });
        }

        let price = self.slipped_price(side, reference_price);
        let slippage_cost = (price - reference_price).abs() * Decimal::from(quantity);
        tracing::debug!(%symbol, ?side, quantity, %reference_price, %price, "simulated fill");

        Ok(Fill {
            symbol: symbol.to_string(),
            side,
            quantity,
            reference_price,
            price,
            commission: self.params.commission_per_trade,
            slippage_cost,
        })
    }
}
