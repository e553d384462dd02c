//! Binance spot auto-trading demo.
//!
//! The library target is shared by the `spot-autotrader` bot and the utility
//! binaries under `src/bin`.

pub mod config;
pub mod error;
pub mod interfaces;
pub mod services;
pub mod utils;
