//! The `error` module defines the error types used within `balance-bus`.
//!
//! The broker itself never fails for normal operation (unknown topics and
//! dead subscribers are expected states), so these errors belong to the
//! layers around it: payload decoding, sensor sources and producer threads.

use thiserror::Error;

/// A payload did not match the expected `value,value[,value]` shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected} comma-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field {index} ({value:?}) is not a valid number")]
    InvalidField { index: usize, value: String },
}

/// Failure while sampling a hardware or simulated resource.
///
/// These stay local to the producer thread that owns the source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("device I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable sample {raw:?} from {device}")]
    InvalidReading { device: String, raw: String },
}

/// Errors surfaced when managing producer threads.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("failed to spawn producer thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("producer thread '{name}' panicked")]
    Panicked { name: String },
}
