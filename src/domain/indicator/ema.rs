//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA = C*k + EMA_prev*(1-k).
//! Warmup: not ready until n samples have arrived.

use crate::domain::error::ReplayError;
use crate::domain::indicator::{check_period, Indicator, IndicatorType};

#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    period: usize,
    k: f64,
    count: usize,
    seed_sum: f64,
    ema: f64,
}

impl ExponentialMovingAverage {
    pub fn new(period: usize) -> Result<Self, ReplayError> {
        check_period("EMA", period)?;
        Ok(ExponentialMovingAverage {
            period,
            k: 2.0 / (period as f64 + 1.0),
            count: 0,
            seed_sum: 0.0,
            ema: 0.0,
        })
    }

    pub fn smoothing(&self) -> f64 {
        self.k
    }
}

impl Indicator for ExponentialMovingAverage {
    fn update(&mut self, price: f64) {
        if self.count < self.period {
            self.seed_sum += price;
            self.count += 1;
            if self.count == self.period {
                self.ema = self.seed_sum / self.period as f64;
            }
        } else {
            self.ema = price * self.k + self.ema * (1.0 - self.k);
        }
    }

    fn ready(&self) -> bool {
        self.count >= self.period
    }

    /// 0 during warmup.
    fn value(&self) -> f64 {
        if self.ready() { self.ema } else { 0.0 }
    }

    fn reset(&mut self) {
        self.count = 0;
        self.seed_sum = 0.0;
        self.ema = 0.0;
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Ema(self.period)
    }
}
