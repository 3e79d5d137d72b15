//! OHLCV bar representation.

use chrono::{DateTime, Utc};
use std::fmt;

/// A single OHLCV record. Fields are private so a `Bar` can only be obtained
/// through [`Bar::new`], which enforces the price and volume invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    symbol: String,
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Why a candidate bar was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BarError {
    #[error("symbol is empty")]
    EmptySymbol,
    #[error("{field} is not a finite non-negative number: {value}")]
    BadValue { field: &'static str, value: f64 },
    #[error("price range violated: low {low} open {open} close {close} high {high}")]
    PriceRange {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

impl Bar {
    /// Validates `low <= min(open, close) <= max(open, close) <= high`,
    /// non-negative finite values and a non-empty symbol.
    pub fn new(
        symbol: impl Into<String>,
        time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BarError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(BarError::EmptySymbol);
        }
        for (field, value) in [
            ("open", open),
            ("high", high),
            ("low", low),
            ("close", close),
            ("volume", volume),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BarError::BadValue { field, value });
            }
        }
        if low > open.min(close) || open.max(close) > high {
            return Err(BarError::PriceRange {
                open,
                high,
                low,
                close,
            });
        }
        Ok(Bar {
            symbol,
            time,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Flat bar where every price equals `close`.
    pub fn flat(symbol: impl Into<String>, time: i64, close: f64) -> Result<Self, BarError> {
        Bar::new(symbol, time, close, close, close, close, 0.0)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Milliseconds since the Unix epoch.
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// `None` when the timestamp is outside chrono's representable range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datetime() {
            Some(dt) => write!(f, "{}@{}", self.symbol, dt.format("%Y-%m-%dT%H:%M:%S%.3fZ"))?,
            None => write!(f, "{}@{}ms", self.symbol, self.time)?,
        }
        write!(
            f,
            " O:{} H:{} L:{} C:{} V:{}",
            self.open, self.high, self.low, self.close, self.volume
        )
    }
}
