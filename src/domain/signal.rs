//! Discrete signals over the bar stream.
//!
//! `CrossoverSignal` compares a fast and a slow indicator fed with the same
//! closes. Only the sign of `fast - slow` on the previous ready bar is kept, so
//! the whole state machine is one small integer.

use std::fmt;

use crate::domain::bar::Bar;
use crate::domain::error::ReplayError;
use crate::domain::indicator::{Indicator, IndicatorType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    Buy,
    Sell,
    /// Signal is defined but nothing changed.
    Hold,
    /// Signal not yet meaningful (warmup).
    None,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Hold => "HOLD",
            SignalType::None => "NONE",
        };
        f.write_str(s)
    }
}

pub trait Signal {
    fn evaluate(&mut self, bar: &Bar) -> SignalType;

    fn reset(&mut self);
}

/// Gap, in ULPs of the larger line, below which the two lines are equal.
/// Running sums drift by a few ULPs, which must not read as a cross.
const NOISE_ULPS: f64 = 16.0;

pub struct CrossoverSignal {
    fast: Box<dyn Indicator>,
    slow: Box<dyn Indicator>,
    epsilon: f64,
    last_sign: i8,
}

impl CrossoverSignal {
    pub fn new(fast: Box<dyn Indicator>, slow: Box<dyn Indicator>) -> Self {
        CrossoverSignal {
            fast,
            slow,
            epsilon: 0.0,
            last_sign: 0,
        }
    }

    /// Both lines built from `IndicatorType`s.
    pub fn from_types(fast: IndicatorType, slow: IndicatorType) -> Result<Self, ReplayError> {
        Ok(CrossoverSignal::new(fast.build()?, slow.build()?))
    }

    /// Differences with `|diff| < epsilon` count as "no side".
    pub fn with_epsilon(mut self, epsilon: f64) -> Result<Self, ReplayError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ReplayError::invalid(
                "strategy",
                "epsilon",
                "epsilon must be a finite non-negative number",
            ));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    pub fn last_sign(&self) -> i8 {
        self.last_sign
    }

    pub fn fast(&self) -> &dyn Indicator {
        self.fast.as_ref()
    }

    pub fn slow(&self) -> &dyn Indicator {
        self.slow.as_ref()
    }

    fn sign(&self, fast: f64, slow: f64) -> i8 {
        let diff = fast - slow;
        let noise = NOISE_ULPS * f64::EPSILON * fast.abs().max(slow.abs());
        if diff.abs() < self.epsilon || diff.abs() <= noise {
            0
        } else if diff > 0.0 {
            1
        } else {
            -1
        }
    }
}

impl Signal for CrossoverSignal {
    fn evaluate(&mut self, bar: &Bar) -> SignalType {
        self.fast.update(bar.close());
        self.slow.update(bar.close());

        if !self.fast.ready() || !self.slow.ready() {
            return SignalType::None;
        }

        let sign = self.sign(self.fast.value(), self.slow.value());
        let signal = if self.last_sign < 0 && sign > 0 {
            SignalType::Buy
        } else if self.last_sign > 0 && sign < 0 {
            SignalType::Sell
        } else {
            SignalType::None
        };
        self.last_sign = sign;
        signal
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.last_sign = 0;
    }
}

impl fmt::Debug for CrossoverSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossoverSignal")
            .field("fast", &self.fast.indicator_type())
            .field("slow", &self.slow.indicator_type())
            .field("epsilon", &self.epsilon)
            .field("last_sign", &self.last_sign)
            .finish()
    }
}
