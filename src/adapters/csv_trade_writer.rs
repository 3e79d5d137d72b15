//! Trade sink that streams records as CSV.

use std::io::Write;

use tracing::warn;

use crate::domain::trade::TradeRecord;
use crate::ports::trade_sink::TradeSink;

pub const HEADER: [&str; 7] = [
    "strategy",
    "symbol",
    "time",
    "price",
    "quantity",
    "side",
    "forced_close",
];

/// Writes a header and then one row per trade. Write failures are logged and
/// counted; they never reach the engine.
pub struct CsvTradeWriter<W: Write> {
    writer: csv::Writer<W>,
    written: u64,
    failures: u64,
}

impl<W: Write> CsvTradeWriter<W> {
    pub fn new(inner: W) -> Self {
        let mut sink = Self {
            writer: csv::Writer::from_writer(inner),
            written: 0,
            failures: 0,
        };
        if let Err(e) = sink.writer.write_record(HEADER) {
            sink.failures += 1;
            warn!(error = %e, "failed to write trade csv header");
        }
        sink
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> std::io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> TradeSink for CsvTradeWriter<W> {
    fn accept(&mut self, record: TradeRecord) {
        let row = [
            record.strategy_name.clone(),
            record.symbol.clone(),
            record.time.to_string(),
            record.price.to_string(),
            record.quantity.to_string(),
            record.side.to_string(),
            record.forced_close.to_string(),
        ];
        match self.writer.write_record(&row) {
            Ok(()) => self.written += 1,
            Err(e) => {
                self.failures += 1;
                warn!(error = %e, trade = %record, "failed to write trade row");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Side;
    use std::io;

    fn record(side: Side, forced_close: bool) -> TradeRecord {
        TradeRecord {
            strategy_name: "ma".into(),
            symbol: "BHP".into(),
            time: 4,
            price: 13.0,
            quantity: 76,
            side,
            forced_close,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let mut sink = CsvTradeWriter::new(Vec::new());
        sink.accept(record(Side::Buy, false));
        sink.accept(record(Side::Sell, true));
        assert_eq!(sink.written(), 2);
        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "strategy,symbol,time,price,quantity,side,forced_close\n\
             ma,BHP,4,13,76,BUY,false\n\
             ma,BHP,4,13,76,SELL,true\n"
        );
    }

    #[test]
    fn quotes_names_with_commas() {
        let mut sink = CsvTradeWriter::new(Vec::new());
        let mut r = record(Side::Buy, false);
        r.strategy_name = "fast,slow".into();
        sink.accept(r);
        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert!(out.contains("\"fast,slow\",BHP"));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    #[test]
    fn write_failures_do_not_panic() {
        let mut sink = CsvTradeWriter::new(Broken);
        for _ in 0..10_000 {
            sink.accept(record(Side::Buy, false));
        }
        assert!(sink.failures() > 0);
        assert!(sink.flush().is_err());
    }
}
