use crate::broker::message::{TOPIC_ACCEL, encode_accel};
use crate::utils::error::SourceError;

use super::Source;

/// A three-axis accelerometer reporting acceleration in g.
pub trait AccelDevice: Send {
    /// Returns `Ok(None)` when no new sample is ready yet.
    fn read(&mut self) -> Result<Option<(f64, f64, f64)>, SourceError>;
}

/// Publishes every sample of `D` on `accl` as `"x,y,z"`.
#[derive(Debug)]
pub struct Accelerometer<D> {
    device: D,
}

impl<D: AccelDevice> Accelerometer<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }
}

impl<D: AccelDevice> Source for Accelerometer<D> {
    fn topic(&self) -> &str {
        TOPIC_ACCEL
    }

    fn poll(&mut self) -> Result<Option<String>, SourceError> {
        Ok(self
            .device
            .read()?
            .map(|(x, y, z)| encode_accel(x, y, z)))
    }
}

/// Board tilted back and forth along a slow figure-eight.
///
/// The output is deterministic: sample `n` is always the same triple, which
/// keeps demos and tests reproducible.
#[derive(Debug, Clone)]
pub struct SimulatedAccelDevice {
    step: f64,
    phase: f64,
    amplitude: f64,
}

impl SimulatedAccelDevice {
    pub fn new(step: f64, amplitude: f64) -> Self {
        Self {
            step,
            phase: 0.0,
            amplitude: amplitude.clamp(0.0, 0.7),
        }
    }
}

impl Default for SimulatedAccelDevice {
    fn default() -> Self {
        Self::new(0.1, 0.6)
    }
}

impl AccelDevice for SimulatedAccelDevice {
    fn read(&mut self) -> Result<Option<(f64, f64, f64)>, SourceError> {
        let x = self.amplitude * self.phase.sin();
        let y = self.amplitude * (2.0 * self.phase).sin() / 2.0;
        // gravity takes up what the tilt leaves
        let z = (1.0 - x * x - y * y).max(0.0).sqrt();
        self.phase += self.step;
        Ok(Some((x, y, z)))
    }
}
