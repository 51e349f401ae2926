use std::fs;
use std::path::PathBuf;

use crate::broker::message::{TOPIC_BUTTON, encode_button};
use crate::utils::error::SourceError;

use super::Source;

/// A single GPIO input. `0` means pressed (active low), anything else
/// released.
pub trait ButtonDevice: Send {
    fn read_value(&mut self) -> Result<i32, SourceError>;
}

/// Publishes `"gpio,value"` on `btn` whenever the button state changes.
///
/// The first successful read always publishes, so subscribers learn the
/// initial state.
#[derive(Debug)]
pub struct Button<D> {
    gpio: i32,
    device: D,
    last: Option<i32>,
}

impl<D: ButtonDevice> Button<D> {
    pub fn new(gpio: i32, device: D) -> Self {
        Self {
            gpio,
            device,
            last: None,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

impl<D: ButtonDevice> Source for Button<D> {
    fn topic(&self) -> &str {
        TOPIC_BUTTON
    }

    fn poll(&mut self) -> Result<Option<String>, SourceError> {
        let value = self.device.read_value()?;
        if self.last == Some(value) {
            return Ok(None);
        }
        self.last = Some(value);
        Ok(Some(encode_button(self.gpio, value)))
    }
}

/// Reads the button value as text from a device node, e.g. the
/// `/dev/my_gpio-btn` node of the board's GPIO driver.
#[derive(Debug, Clone)]
pub struct FileButtonDevice {
    path: PathBuf,
}

impl FileButtonDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ButtonDevice for FileButtonDevice {
    fn read_value(&mut self) -> Result<i32, SourceError> {
        let raw = fs::read_to_string(&self.path)?;
        let raw = raw.trim();
        match raw.parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(SourceError::InvalidReading {
                device: self.path.display().to_string(),
                raw: raw.to_string(),
            }),
        }
    }
}

/// Reads pressed (`0`) for one poll out of every `press_every` and released
/// (`1`) on all the others.
#[derive(Debug, Clone)]
pub struct SimulatedButtonDevice {
    press_every: u32,
    polls: u32,
}

impl SimulatedButtonDevice {
    pub fn new(press_every: u32) -> Self {
        Self {
            press_every: press_every.max(1),
            polls: 0,
        }
    }
}

impl ButtonDevice for SimulatedButtonDevice {
    fn read_value(&mut self) -> Result<i32, SourceError> {
        self.polls = self.polls.wrapping_add(1);
        Ok(if self.polls % self.press_every == 0 { 0 } else { 1 })
    }
}
