//! replaytrader: deterministic event-driven backtest core.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`cli`] is a thin host binary
//! built on top of the library.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
