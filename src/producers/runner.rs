//! Producer threads
//!
//! Each producer runs on its own named OS thread:
//!
//! ```text
//! loop while alive {
//!   source.poll() ── Ok(Some) ──► broker.publish(msg)   (dispatch on this thread)
//!                 ── Ok(None) ──► nothing to send
//!                 ── Err      ──► warn!, keep going
//!   park_timeout(interval)       (stop() unparks early)
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::broker::Broker;
use crate::utils::error::ProducerError;

use super::Source;

#[derive(Debug)]
pub struct Producer {
    name: String,
    alive: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Producer {
    /// Spawns a thread named `name` that polls `source` every `interval` and
    /// publishes the results on `broker`.
    pub fn spawn<S>(
        name: &str,
        broker: Arc<Broker>,
        mut source: S,
        interval: Duration,
    ) -> Result<Self, ProducerError>
    where
        S: Source + 'static,
    {
        let alive = Arc::new(AtomicBool::new(true));
        let flag = alive.clone();
        let thread_name = name.to_string();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                info!(
                    producer = %thread_name,
                    topic = source.topic(),
                    ?interval,
                    "producer started"
                );
                let mut published: u64 = 0;

                while flag.load(Ordering::Acquire) {
                    match source.next_message() {
                        Ok(Some(msg)) => {
                            let delivery = broker.publish(msg);
                            published += 1;
                            debug!(producer = %thread_name, ?delivery, "sample published");
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!(producer = %thread_name, error = %e, "sampling failed");
                        }
                    }
                    thread::park_timeout(interval);
                }

                info!(producer = %thread_name, published, "producer stopped");
            })
            .map_err(|source| ProducerError::Spawn {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.to_string(),
            alive,
            handle,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::Acquire) && !self.handle.is_finished()
    }

    /// Clears the liveness flag and wakes the thread if it is sleeping. The
    /// loop exits after finishing its current iteration.
    pub fn stop(&self) {
        self.alive.store(false, Ordering::Release);
        self.handle.thread().unpark();
    }

    /// Stops the producer and waits for its thread to return.
    pub fn join(self) -> Result<(), ProducerError> {
        self.stop();
        self.handle.join().map_err(|_| ProducerError::Panicked {
            name: self.name,
        })
    }
}
