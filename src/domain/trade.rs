//! Executed trade records.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

/// One fill, produced by the engine and handed to the trade sink.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub strategy_name: String,
    pub symbol: String,
    /// Time of the triggering bar, milliseconds since the epoch.
    pub time: i64,
    /// The triggering bar's close.
    pub price: f64,
    pub quantity: u64,
    pub side: Side,
    /// Synthetic end-of-run liquidation.
    pub forced_close: bool,
}

impl TradeRecord {
    pub fn notional(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} x{} @ {} t={}",
            self.strategy_name, self.side, self.symbol, self.quantity, self.price, self.time
        )?;
        if self.forced_close {
            f.write_str(" (forced close)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TradeRecord {
        TradeRecord {
            strategy_name: "ma".into(),
            symbol: "BHP".into(),
            time: 4,
            price: 13.0,
            quantity: 76,
            side: Side::Buy,
            forced_close: false,
        }
    }

    #[test]
    fn notional() {
        assert!((sample().notional() - 988.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display() {
        assert_eq!(sample().to_string(), "ma BUY BHP x76 @ 13 t=4");
        let forced = TradeRecord {
            side: Side::Sell,
            forced_close: true,
            ..sample()
        };
        assert_eq!(forced.to_string(), "ma SELL BHP x76 @ 13 t=4 (forced close)");
    }
}
