//! Fixed-bar strategy: buy on one bar number, sell on a later one.
//! Bar numbers are 1-based.

use crate::domain::bar::Bar;
use crate::domain::error::ReplayError;
use crate::domain::strategy::{Strategy, StrategyAction};

#[derive(Debug, Clone)]
pub struct FixedBarStrategy {
    name: String,
    buy_bar: u64,
    sell_bar: u64,
    index: u64,
}

impl FixedBarStrategy {
    /// Requires `1 <= buy_bar < sell_bar`.
    pub fn new(name: impl Into<String>, buy_bar: u64, sell_bar: u64) -> Result<Self, ReplayError> {
        if buy_bar < 1 {
            return Err(ReplayError::invalid(
                "strategy",
                "buy_bar",
                "buy_bar must be at least 1",
            ));
        }
        if sell_bar <= buy_bar {
            return Err(ReplayError::invalid(
                "strategy",
                "sell_bar",
                format!("sell_bar {sell_bar} must be greater than buy_bar {buy_bar}"),
            ));
        }
        Ok(FixedBarStrategy {
            name: name.into(),
            buy_bar,
            sell_bar,
            index: 0,
        })
    }

    /// Number of bars seen so far.
    pub fn index(&self) -> u64 {
        self.index
    }
}

impl Strategy for FixedBarStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&mut self) {
        self.index = 0;
    }

    fn on_bar(&mut self, _bar: &Bar) -> StrategyAction {
        self.index += 1;
        if self.index == self.buy_bar {
            StrategyAction::OpenLong
        } else if self.index == self.sell_bar {
            StrategyAction::CloseLong
        } else {
            StrategyAction::None
        }
    }
}
