//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod exposure;
pub mod simulator;
pub mod drawdown;
pub mod pipeline;
pub mod metrics;
pub mod strategy;
pub mod config_validation;
pub mod error;
