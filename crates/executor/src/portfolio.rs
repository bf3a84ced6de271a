use crate::error::ExecutorError;
use crate::exchange::Fill;
use chrono::NaiveDate;
use core_types::{ExitReason, OrderSide, Position, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An open long position inside the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPosition {
    pub symbol: String,
    pub quantity: u64,
    /// Entry fill price, slippage included.
    pub entry_price: Decimal,
    pub entry_date: NaiveDate,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    /// Highest close seen since entry; drives the trailing stop.
    pub highest_price: Decimal,
    /// Latest mark-to-market price.
    pub last_price: Decimal,
    pub entry_commission: Decimal,
    pub entry_slippage: Decimal,
}

impl SimulatedPosition {
    pub fn market_value(&self) -> Decimal {
        self.last_price * Decimal::from(self.quantity)
    }
}

/// Cash and open positions of a simulated account.
///
/// Positions live in a `BTreeMap` so every iteration is in symbol order and two
/// runs over the same inputs behave identically.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: Decimal,
    positions: BTreeMap<String, SimulatedPosition>,
}

impl Portfolio {
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            cash: initial_capital,
            positions: BTreeMap::new(),
        }
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn position(&self, symbol: &str) -> Option<&SimulatedPosition> {
        self.positions.get(symbol)
    }

    pub fn position_mut(&mut self, symbol: &str) -> Option<&mut SimulatedPosition> {
        self.positions.get_mut(symbol)
    }

    pub fn positions(&self) -> impl Iterator<Item = &SimulatedPosition> {
        self.positions.values()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn is_flat(&self) -> bool {
        self.positions.is_empty()
    }

    /// Opens a position from a buy fill, debiting notional plus commission.
    pub fn open(
        &mut self,
        fill: &Fill,
        date: NaiveDate,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    ) -> Result<&SimulatedPosition, ExecutorError> {
        if self.positions.contains_key(&fill.symbol) {
            return Err(ExecutorError::PositionAlreadyOpen(fill.symbol.clone()));
        }
        let required = fill.notional() + fill.commission;
        if required > self.cash {
            return Err(ExecutorError::InsufficientCash {
                required,
                available: self.cash,
            });
        }

        self.cash -= required;
        let position = SimulatedPosition {
            symbol: fill.symbol.clone(),
            quantity: fill.quantity,
            entry_price: fill.price,
            entry_date: date,
            stop_loss,
            take_profit,
            highest_price: fill.reference_price,
            last_price: fill.reference_price,
            entry_commission: fill.commission,
            entry_slippage: fill.slippage_cost,
        };
        let position = self.positions.entry(fill.symbol.clone()).or_insert(position);
        Ok(&*position)
    }

    /// Closes the whole position for `fill.symbol`, credits the proceeds and
    /// returns the completed trade.
    ///
    /// PnL is net of both commissions. Both legs' slippage is already in the
    /// fill prices. `pnl_percent` is in percent of the entry notional.
    pub fn close(&mut self, fill: &Fill, date: NaiveDate, reason: ExitReason) -> Result<Trade, ExecutorError> {
        let position = self
            .positions
            .get(&fill.symbol)
            .ok_or_else(|| ExecutorError::PositionNotFound(fill.symbol.clone()))?;
        if fill.quantity != position.quantity {
            return Err(ExecutorError::InvalidQuantity {
                quantity: fill.quantity,
                price: fill.reference_price,
            });
        }
        let Some(position) = self.positions.remove(&fill.symbol) else {
            return Err(ExecutorError::PositionNotFound(fill.symbol.clone()));
        };

        self.cash += fill.notional() - fill.commission;

        let quantity = Decimal::from(position.quantity);
        let commission = position.entry_commission + fill.commission;
        let pnl = (fill.price - position.entry_price) * quantity - commission;
        let entry_notional = position.entry_price * quantity;
        let pnl_percent = if entry_notional.is_zero() {
            Decimal::ZERO
        } else {
            pnl / entry_notional * Decimal::ONE_HUNDRED
        };

        Ok(Trade {
            entry_date: position.entry_date,
            exit_date: date,
            symbol: position.symbol,
            side: OrderSide::Buy,
            entry_price: position.entry_price,
            exit_price: fill.price,
            quantity: position.quantity,
            pnl,
            pnl_percent,
            commission,
            slippage: position.entry_slippage + fill.slippage_cost,
            holding_period_days: (date - position.entry_date).num_days(),
            exit_reason: reason,
        })
    }

    /// Marks an open position to `price`. Unknown symbols are ignored.
    pub fn mark(&mut self, symbol: &str, price: Decimal) {
        if let Some(position) = self.positions.get_mut(symbol) {
            position.last_price = price;
            position.highest_price = position.highest_price.max(price);
        }
    }

    /// Cash plus mark-to-market value of every open position.
    pub fn equity(&self) -> Decimal {
        self.cash + self.positions.values().map(SimulatedPosition::market_value).sum::<Decimal>()
    }

    /// Open positions in the shape the risk checks expect.
    pub fn risk_positions(&self) -> Vec<Position> {
        self.positions
            .values()
            .map(|p| Position {
                symbol: p.symbol.clone(),
                quantity: p.quantity,
                entry_price: p.entry_price,
                current_price: p.last_price,
            })
            .collect()
    }
}
