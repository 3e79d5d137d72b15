//! Moving-average crossover strategy.
//!
//! Opens on a golden cross while flat, closes on a death cross while long.

use crate::domain::bar::Bar;
use crate::domain::error::ReplayError;
use crate::domain::indicator::IndicatorType;
use crate::domain::signal::{CrossoverSignal, Signal, SignalType};
use crate::domain::strategy::{Strategy, StrategyAction};

#[derive(Debug)]
pub struct MovingAverageStrategy {
    name: String,
    signal: CrossoverSignal,
    has_position: bool,
}

impl MovingAverageStrategy {
    pub fn new(name: impl Into<String>, signal: CrossoverSignal) -> Self {
        MovingAverageStrategy {
            name: name.into(),
            signal,
            has_position: false,
        }
    }

    /// Fast/slow SMA crossover. The fast period must be shorter than the slow one.
    pub fn sma(name: impl Into<String>, fast: usize, slow: usize) -> Result<Self, ReplayError> {
        Self::with_lines(name, IndicatorType::Sma(fast), IndicatorType::Sma(slow))
    }

    pub fn with_lines(
        name: impl Into<String>,
        fast: IndicatorType,
        slow: IndicatorType,
    ) -> Result<Self, ReplayError> {
        if fast.period() >= slow.period() {
            return Err(ReplayError::invalid(
                "strategy",
                "fast_period",
                format!(
                    "fast period {} must be less than slow period {}",
                    fast.period(),
                    slow.period()
                ),
            ));
        }
        let signal = CrossoverSignal::from_types(fast, slow)?;
        Ok(Self::new(name, signal))
    }

    /// Dead band applied to the crossover, see [`CrossoverSignal::with_epsilon`].
    pub fn with_epsilon(mut self, epsilon: f64) -> Result<Self, ReplayError> {
        self.signal = self.signal.with_epsilon(epsilon)?;
        Ok(self)
    }

    pub fn has_position(&self) -> bool {
        self.has_position
    }

    pub fn signal(&self) -> &CrossoverSignal {
        &self.signal
    }
}

impl Strategy for MovingAverageStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&mut self) {
        self.signal.reset();
        self.has_position = false;
    }

    fn on_bar(&mut self, bar: &Bar) -> StrategyAction {
        match self.signal.evaluate(bar) {
            SignalType::Buy if !self.has_position => {
                self.has_position = true;
                StrategyAction::OpenLong
            }
            SignalType::Sell if self.has_position => {
                self.has_position = false;
                StrategyAction::CloseLong
            }
            _ => StrategyAction::None,
        }
    }
}
