//! Trade sink that keeps everything in memory.

use crate::domain::event::EngineEvent;
use crate::domain::trade::TradeRecord;
use crate::ports::trade_sink::TradeSink;

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Vec<TradeRecord>,
    events: Vec<EngineEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn into_records(self) -> Vec<TradeRecord> {
        self.records
    }
}

impl TradeSink for RecordingSink {
    fn accept(&mut self, record: TradeRecord) {
        self.records.push(record);
    }

    fn on_event(&mut self, event: &EngineEvent) {
        self.events.push(event.clone());
    }
}
