//! The `producers` module owns the sensing side of the system.
//!
//! A [`Producer`] is an OS thread that repeatedly polls a [`Source`], wraps
//! whatever it yields into a [`Message`] and publishes it on the shared
//! broker. Sources wrap a device behind a small trait ([`AccelDevice`],
//! [`ButtonDevice`]) so that real hardware drivers and simulations plug in
//! the same way.
//!
//! Device errors stay inside the producer thread: they are logged and the
//! loop carries on with the next poll.

pub mod accelerometer;
pub mod button;
pub mod runner;

pub use accelerometer::{AccelDevice, Accelerometer, SimulatedAccelDevice};
pub use button::{Button, ButtonDevice, FileButtonDevice, SimulatedButtonDevice};
pub use runner::Producer;

use crate::broker::Message;
use crate::utils::error::SourceError;

/// Something a producer thread can poll for payloads.
pub trait Source: Send {
    /// Topic every payload of this source is published on.
    fn topic(&self) -> &str;

    /// Samples the underlying device once. `Ok(None)` means there is nothing
    /// to publish this round.
    fn poll(&mut self) -> Result<Option<String>, SourceError>;

    /// Polls and wraps the payload into a message.
    fn next_message(&mut self) -> Result<Option<Message>, SourceError> {
        Ok(self.poll()?.map(|payload| Message::new(self.topic(), payload)))
    }
}

#[cfg(test)]
mod tests;
