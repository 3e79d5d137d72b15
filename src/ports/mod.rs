//! Port traits: the seams between the backtest core and its hosts.

pub mod bar_source;
pub mod config_port;
pub mod trade_sink;
