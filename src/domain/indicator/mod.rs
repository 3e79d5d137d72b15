//! Streaming technical indicators.
//!
//! - `Indicator`: a stateful scalar function over a price stream
//! - `IndicatorType`: identity + parameters, used for display and construction
//!
//! Callers must gate on [`Indicator::ready`] before reading a value.

pub mod ema;
pub mod sma;

use std::fmt;

use crate::domain::error::ReplayError;

pub use ema::ExponentialMovingAverage;
pub use sma::SimpleMovingAverage;

pub trait Indicator {
    fn update(&mut self, price: f64);

    fn ready(&self) -> bool;

    /// Current value. Only meaningful once `ready()` is true.
    fn value(&self) -> f64;

    /// Drop all accumulated samples.
    fn reset(&mut self);

    fn indicator_type(&self) -> IndicatorType;

    /// `Some(value)` when ready.
    fn current(&self) -> Option<f64> {
        self.ready().then(|| self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
}

impl IndicatorType {
    pub fn period(&self) -> usize {
        match self {
            IndicatorType::Sma(period) | IndicatorType::Ema(period) => *period,
        }
    }

    /// Build a fresh indicator of this type.
    pub fn build(&self) -> Result<Box<dyn Indicator>, ReplayError> {
        Ok(match *self {
            IndicatorType::Sma(period) => Box::new(SimpleMovingAverage::new(period)?),
            IndicatorType::Ema(period) => Box::new(ExponentialMovingAverage::new(period)?),
        })
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
        }
    }
}

pub(crate) fn check_period(kind: &str, period: usize) -> Result<(), ReplayError> {
    if period == 0 {
        return Err(ReplayError::invalid(
            "indicator",
            "period",
            format!("{kind} period must be at least 1"),
        ));
    }
    Ok(())
}
