//! The `utils` module provides the shared pieces used across `balance-bus`:
//! error types and logging initialisation.

pub mod error;
pub mod logging;
