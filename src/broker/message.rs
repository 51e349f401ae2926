//! Message definitions for the broker
//!
//! `Message` is the immutable value carried by the broker. The payload is an
//! application-defined string that the broker routes but never inspects.
//!
//! The encode/decode helpers below are the two payload formats spoken by the
//! sensor producers:
//! - accelerometer samples on `accl`: `"x,y,z"` (three `f64`)
//! - button state changes on `btn`: `"gpio,value"` (two `i32`)

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::error::DecodeError;

/// Accelerometer samples.
pub const TOPIC_ACCEL: &str = "accl";
/// Button state changes.
pub const TOPIC_BUTTON: &str = "btn";
/// Derived event raised when the ball leaves the screen.
pub const TOPIC_BOUNDARY: &str = "boundary";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    topic: String,
    payload: String,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// JSON form used by the logger's `json` output format.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub fn encode_accel(x: f64, y: f64, z: f64) -> String {
    format!("{x},{y},{z}")
}

pub fn decode_accel(payload: &str) -> Result<(f64, f64, f64), DecodeError> {
    let [x, y, z] = decode_fields::<f64, 3>(payload)?;
    Ok((x, y, z))
}

pub fn encode_button(gpio: i32, value: i32) -> String {
    format!("{gpio},{value}")
}

pub fn decode_button(payload: &str) -> Result<(i32, i32), DecodeError> {
    let [gpio, value] = decode_fields::<i32, 2>(payload)?;
    Ok((gpio, value))
}

/// Splits `payload` on commas and parses exactly `N` fields.
fn decode_fields<T, const N: usize>(payload: &str) -> Result<[T; N], DecodeError>
where
    T: FromStr + Copy + Default,
{
    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() != N {
        return Err(DecodeError::FieldCount {
            expected: N,
            found: fields.len(),
        });
    }

    let mut out = [T::default(); N];
    for (index, raw) in fields.into_iter().enumerate() {
        let raw = raw.trim();
        out[index] = raw.parse().map_err(|_| DecodeError::InvalidField {
            index,
            value: raw.to_string(),
        })?;
    }
    Ok(out)
}
