//! Outbound port for executed trades.

use crate::domain::event::EngineEvent;
use crate::domain::trade::TradeRecord;

/// Receives trades synchronously from the engine, in execution order.
///
/// Implementations must not block and must not panic; I/O failures are
/// theirs to swallow or log. The engine is not re-entrant from a sink.
pub trait TradeSink {
    fn accept(&mut self, record: TradeRecord);

    /// Skipped or rejected actions. Default: ignore.
    fn on_event(&mut self, _event: &EngineEvent) {}
}

impl<K: TradeSink + ?Sized> TradeSink for &mut K {
    fn accept(&mut self, record: TradeRecord) {
        (**self).accept(record)
    }

    fn on_event(&mut self, event: &EngineEvent) {
        (**self).on_event(event)
    }
}

impl<K: TradeSink + ?Sized> TradeSink for Box<K> {
    fn accept(&mut self, record: TradeRecord) {
        (**self).accept(record)
    }

    fn on_event(&mut self, event: &EngineEvent) {
        (**self).on_event(event)
    }
}
