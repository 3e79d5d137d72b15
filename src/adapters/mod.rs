//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_trade_writer;
pub mod file_config_adapter;
pub mod recording_sink;
pub mod vec_bar_source;

pub use csv_adapter::CsvBarSource;
pub use csv_trade_writer::CsvTradeWriter;
pub use file_config_adapter::FileConfigAdapter;
pub use recording_sink::RecordingSink;
pub use vec_bar_source::VecBarSource;
