//! Core domain types and logic: the deterministic replay pipeline.

pub mod bar;
pub mod indicator;
pub mod signal;
pub mod strategy;
pub mod account;
pub mod trade;
pub mod event;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
