//! Simple Moving Average indicator.
//!
//! SMA(n) = sum(C[i-j] for j in 0..n) / n, kept in O(1) per update with a
//! running sum over a ring buffer of the last n closes.
//! Warmup: not ready until n samples have arrived.

use std::collections::VecDeque;

use crate::domain::error::ReplayError;
use crate::domain::indicator::{check_period, Indicator, IndicatorType};

/// Updates between full recomputations of the running sum, per unit of period.
const RESUM_FACTOR: usize = 64;

/// Upper bound on the window slots reserved up front.
const PREALLOC_LIMIT: usize = 1024;

#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
    since_resum: usize,
}

impl SimpleMovingAverage {
    pub fn new(period: usize) -> Result<Self, ReplayError> {
        check_period("SMA", period)?;
        Ok(SimpleMovingAverage {
            period,
            window: VecDeque::with_capacity(period.min(PREALLOC_LIMIT) + 1),
            sum: 0.0,
            since_resum: 0,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Indicator for SimpleMovingAverage {
    fn update(&mut self, price: f64) {
        self.window.push_back(price);
        self.sum += price;
        if self.window.len() > self.period {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
            }
        }

        self.since_resum += 1;
        if self.since_resum >= self.period.saturating_mul(RESUM_FACTOR) {
            self.sum = self.window.iter().sum();
            self.since_resum = 0;
        }
    }

    fn ready(&self) -> bool {
        self.window.len() == self.period
    }

    /// Partial mean during warmup, 0 when empty.
    fn value(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        if self.ready() {
            self.sum / self.period as f64
        } else {
            self.sum / self.window.len() as f64
        }
    }

    fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
        self.since_resum = 0;
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Sma(self.period)
    }
}
