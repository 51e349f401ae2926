//! Broker engine
//!
//! This module contains the in-process broker responsible for:
//! - managing topics and their ordered subscriber lists
//! - fanning a published message out to every live subscriber
//!
//! Concurrency and usage notes:
//! - A single `Broker` is created at start-up and shared as `Arc<Broker>`
//!   between producer threads and consumers. All methods take `&self`; the
//!   registry sits behind one internal mutex.
//! - `publish` copies the subscriber list under the lock and releases the
//!   lock before any callback runs. Callbacks are therefore free to publish,
//!   subscribe or unsubscribe on the same broker from the same thread.
//! - A consumer that unsubscribes while a publish is already dispatching on
//!   another thread may still receive that one message.
//! - Delivery order within one publish is subscription order. There is no
//!   ordering between publishes made from different threads.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, error, trace};

use super::consumer::{Consumer, Subscription, SubscriptionId};
use super::message::Message;
use super::topic::{Subscriber, Topic};

/// Outcome of a single [`Broker::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Consumers whose `on_message` returned normally.
    pub delivered: usize,
    /// Entries whose consumer had already been dropped.
    pub skipped: usize,
    /// Consumers whose `on_message` panicked.
    pub failed: usize,
}

#[derive(Default)]
pub struct Broker {
    topics: Mutex<HashMap<String, Topic>>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry guard. A poisoned lock is recovered since no callback ever
    /// runs while it is held.
    fn registry(&self) -> MutexGuard<'_, HashMap<String, Topic>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribes `consumer` to `topic`, creating the topic if needed.
    ///
    /// The broker keeps only a weak reference. Subscribing the same consumer
    /// twice yields two entries and two deliveries per publish.
    pub fn subscribe<C>(&self, topic: &str, consumer: &Arc<C>) -> Subscription
    where
        C: Consumer + 'static,
    {
        let weak: Weak<C> = Arc::downgrade(consumer);
        self.register(topic, weak, consumer.name())
    }

    /// Same as [`Broker::subscribe`] for a consumer only known as a trait
    /// object.
    pub fn subscribe_dyn(&self, topic: &str, consumer: &Arc<dyn Consumer>) -> Subscription {
        self.register(topic, Arc::downgrade(consumer), consumer.name())
    }

    fn register(&self, topic: &str, consumer: Weak<dyn Consumer>, name: &str) -> Subscription {
        let id = SubscriptionId::next();

        self.registry()
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic))
            .subscribe(Subscriber { id, consumer });

        debug!(topic, consumer = name, id = id.as_u64(), "subscribed");
        Subscription {
            topic: topic.to_string(),
            id,
        }
    }

    /// Removes every entry of `consumer` from `topic`, plus any entry whose
    /// consumer has already been dropped. An emptied topic is removed.
    /// Unknown topics are a no-op.
    pub fn unsubscribe<C>(&self, topic: &str, consumer: &Arc<C>)
    where
        C: Consumer + ?Sized,
    {
        let mut topics = self.registry();
        let Some(t) = topics.get_mut(topic) else {
            return;
        };

        let removed = t.unsubscribe(consumer);
        if t.is_empty() {
            topics.remove(topic);
        }
        debug!(topic, removed, "unsubscribed");
    }

    /// Removes exactly the entry created for `subscription`, along with any
    /// expired entries of the same topic. Returns whether the entry was still
    /// registered.
    pub fn cancel(&self, subscription: &Subscription) -> bool {
        let mut topics = self.registry();
        let Some(t) = topics.get_mut(&subscription.topic) else {
            return false;
        };

        let found = t.cancel(subscription.id);
        if t.is_empty() {
            topics.remove(&subscription.topic);
        }
        found
    }

    /// Delivers `msg` to every live subscriber of its topic, synchronously on
    /// the calling thread.
    ///
    /// Publishing to a topic without subscribers is not an error. Dropped
    /// consumers are skipped. A panicking consumer is logged and counted, and
    /// dispatch continues with the next one.
    pub fn publish(&self, msg: Message) -> Delivery {
        let snapshot: Vec<Subscriber> = {
            let topics = self.registry();
            match topics.get(msg.topic()) {
                Some(topic) => topic.subscribers.clone(),
                None => {
                    debug!(topic = msg.topic(), "no subscribers for topic");
                    return Delivery::default();
                }
            }
        };

        let mut delivery = Delivery::default();
        for sub in &snapshot {
            let Some(consumer) = sub.consumer.upgrade() else {
                delivery.skipped += 1;
                continue;
            };

            match catch_unwind(AssertUnwindSafe(|| consumer.on_message(&msg))) {
                Ok(()) => delivery.delivered += 1,
                Err(panic) => {
                    delivery.failed += 1;
                    error!(
                        topic = msg.topic(),
                        consumer = consumer.name(),
                        reason = panic_message(panic.as_ref()),
                        "consumer panicked during dispatch"
                    );
                }
            }
        }

        trace!(topic = msg.topic(), ?delivery, "published");
        delivery
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.registry().contains_key(topic)
    }

    /// Number of registry entries for `topic`, including expired ones that
    /// no `unsubscribe` has pruned yet.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry().get(topic).map_or(0, Topic::len)
    }

    /// Topic names currently present, sorted.
    pub fn topics(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("topics", &self.topics())
            .finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
