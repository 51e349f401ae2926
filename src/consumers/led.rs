use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::broker::message::{TOPIC_BUTTON, decode_button};
use crate::broker::{Consumer, Message};

/// LED that lights while the button is held down.
///
/// With a device path the state is also written there as `1`/`0`; without
/// one the LED only exists in memory.
#[derive(Debug, Default)]
pub struct Led {
    device: Option<PathBuf>,
    lit: AtomicBool,
}

impl Led {
    pub fn new(device: Option<PathBuf>) -> Self {
        Self {
            device,
            lit: AtomicBool::new(false),
        }
    }

    pub fn is_on(&self) -> bool {
        self.lit.load(Ordering::Acquire)
    }

    pub fn on(&self) {
        self.set(true);
    }

    pub fn off(&self) {
        self.set(false);
    }

    fn set(&self, lit: bool) {
        self.lit.store(lit, Ordering::Release);
        let Some(device) = &self.device else {
            return;
        };
        if let Err(e) = fs::write(device, if lit { "1" } else { "0" }) {
            warn!(device = %device.display(), error = %e, "failed to drive led");
        }
    }
}

impl Consumer for Led {
    fn on_message(&self, message: &Message) {
        if message.topic() != TOPIC_BUTTON {
            return;
        }
        match decode_button(message.payload()) {
            Ok((gpio, 0)) => {
                debug!(gpio, "led on");
                self.on();
            }
            Ok((gpio, _)) => {
                debug!(gpio, "led off");
                self.off();
            }
            Err(e) => {
                warn!(payload = message.payload(), error = %e, "led ignoring malformed event");
            }
        }
    }

    fn name(&self) -> &str {
        "led"
    }
}
