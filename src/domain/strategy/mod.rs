//! Strategies: per-bar decision makers.
//!
//! A strategy sees each bar once and answers with at most one
//! [`StrategyAction`]. It never touches the account; the engine routes the
//! action and the account has the final word.

pub mod fixed_bar;
pub mod moving_average;

use std::fmt;

use crate::domain::bar::Bar;

pub use fixed_bar::FixedBarStrategy;
pub use moving_average::MovingAverageStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyAction {
    None,
    OpenLong,
    CloseLong,
}

impl fmt::Display for StrategyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyAction::None => "none",
            StrategyAction::OpenLong => "open_long",
            StrategyAction::CloseLong => "close_long",
        };
        f.write_str(s)
    }
}

pub trait Strategy {
    /// Stable identifier copied into every trade record.
    fn name(&self) -> &str;

    /// Reset internal state. Called once before the first `on_bar`.
    fn on_start(&mut self) {}

    fn on_bar(&mut self, bar: &Bar) -> StrategyAction;

    /// Called once after the last `on_bar`.
    fn on_finish(&mut self) {}
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_start(&mut self) {
        (**self).on_start()
    }

    fn on_bar(&mut self, bar: &Bar) -> StrategyAction {
        (**self).on_bar(bar)
    }

    fn on_finish(&mut self) {
        (**self).on_finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(StrategyAction);

    impl Strategy for Always {
        fn name(&self) -> &str {
            "always"
        }

        fn on_bar(&mut self, _bar: &Bar) -> StrategyAction {
            self.0
        }
    }

    #[test]
    fn action_display() {
        assert_eq!(StrategyAction::OpenLong.to_string(), "open_long");
        assert_eq!(StrategyAction::CloseLong.to_string(), "close_long");
        assert_eq!(StrategyAction::None.to_string(), "none");
    }

    #[test]
    fn boxed_strategy_delegates() {
        let mut boxed: Box<dyn Strategy> = Box::new(Always(StrategyAction::OpenLong));
        let bar = Bar::flat("X", 0, 1.0).unwrap();
        boxed.on_start();
        assert_eq!(boxed.name(), "always");
        assert_eq!(boxed.on_bar(&bar), StrategyAction::OpenLong);
        boxed.on_finish();
    }
}
