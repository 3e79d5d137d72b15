//! Simulated cash + position ledger.
//!
//! Long-only, all-in/all-out: there is at most one open position and it is
//! always closed in full. Every fill happens at the triggering bar's close.

use crate::domain::bar::Bar;
use crate::domain::error::ReplayError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Position {
    pub quantity: u64,
    pub avg_price: f64,
}

impl Position {
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.avg_price)
    }
}

/// Result of an open attempt. Only `Opened` mutates the account.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenOutcome {
    Opened {
        quantity: u64,
        price: f64,
        cost: f64,
    },
    InsufficientCash {
        cost: f64,
        cash: f64,
    },
    AlreadyLong {
        quantity: u64,
    },
    ZeroQuantity,
}

impl OpenOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, OpenOutcome::Opened { .. })
    }
}

/// Result of a close attempt. Only `Closed` mutates the account.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    Closed {
        quantity: u64,
        price: f64,
        proceeds: f64,
        pnl: f64,
    },
    NoPosition,
}

impl CloseOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, CloseOutcome::Closed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    cash: f64,
    initial_cash: f64,
    position: Position,
    realized_pnl: f64,
    last_mark: f64,
}

impl Account {
    pub fn new(initial_cash: f64) -> Result<Self, ReplayError> {
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(ReplayError::invalid(
                "engine",
                "initial_cash",
                "initial_cash must be a finite positive number",
            ));
        }
        Ok(Account {
            cash: initial_cash,
            initial_cash,
            position: Position::default(),
            realized_pnl: 0.0,
            last_mark: 0.0,
        })
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// Open quantity, 0 when flat.
    pub fn position(&self) -> u64 {
        self.position.quantity
    }

    /// Price paid for the open position, 0 when flat.
    pub fn entry_price(&self) -> f64 {
        self.position.avg_price
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_empty()
    }

    pub fn last_mark(&self) -> f64 {
        self.last_mark
    }

    /// Record the latest market price used by `equity`.
    pub fn mark(&mut self, price: f64) {
        self.last_mark = price;
    }

    /// cash + position * last mark
    pub fn equity(&self) -> f64 {
        self.cash + self.position.market_value(self.last_mark)
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.position.unrealized_pnl(self.last_mark)
    }

    /// Largest whole quantity whose cost at `price` fits in the cash.
    pub fn affordable_quantity(&self, price: f64) -> u64 {
        if !price.is_finite() || price <= 0.0 {
            return 0;
        }
        let mut quantity = (self.cash / price).floor() as u64;
        while quantity > 0 && quantity as f64 * price > self.cash {
            quantity -= 1;
        }
        quantity
    }

    /// Buy `quantity` at the bar's close.
    pub fn open_long(&mut self, bar: &Bar, quantity: u64) -> OpenOutcome {
        if !self.position.is_empty() {
            return OpenOutcome::AlreadyLong {
                quantity: self.position.quantity,
            };
        }
        if quantity == 0 {
            return OpenOutcome::ZeroQuantity;
        }

        let price = bar.close();
        let cost = price * quantity as f64;
        if cost > self.cash {
            return OpenOutcome::InsufficientCash {
                cost,
                cash: self.cash,
            };
        }

        self.cash -= cost;
        self.position = Position {
            quantity,
            avg_price: price,
        };
        self.last_mark = price;

        OpenOutcome::Opened {
            quantity,
            price,
            cost,
        }
    }

    /// Sell the whole position at the bar's close.
    pub fn close_long(&mut self, bar: &Bar) -> CloseOutcome {
        if self.position.is_empty() {
            return CloseOutcome::NoPosition;
        }

        let price = bar.close();
        let quantity = self.position.quantity;
        let proceeds = price * quantity as f64;
        let pnl = (price - self.position.avg_price) * quantity as f64;

        self.cash += proceeds;
        self.realized_pnl += pnl;
        self.position = Position::default();
        self.last_mark = price;

        CloseOutcome::Closed {
            quantity,
            price,
            proceeds,
            pnl,
        }
    }
}
