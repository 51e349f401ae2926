//! Topic management
//!
//! A `Topic` holds the ordered list of subscribers for one topic name.
//! Subscription order is delivery order and duplicate subscriptions are kept
//! as separate entries.
//!
//! Concurrency note: callers must synchronize access to `Topic` (the broker
//! keeps every topic behind its registry lock).

use std::sync::{Arc, Weak};

use super::consumer::{Consumer, SubscriptionId};

#[derive(Clone)]
pub(crate) struct Subscriber {
    pub(crate) id: SubscriptionId,
    pub(crate) consumer: Weak<dyn Consumer>,
}

impl Subscriber {
    pub(crate) fn is_expired(&self) -> bool {
        self.consumer.strong_count() == 0
    }

    /// Identity check by allocation address; the vtable half of the fat
    /// pointer is ignored.
    pub(crate) fn is<C: ?Sized>(&self, consumer: &Arc<C>) -> bool {
        std::ptr::eq(
            self.consumer.as_ptr() as *const (),
            Arc::as_ptr(consumer) as *const (),
        )
    }
}

pub struct Topic {
    pub name: String,
    pub(crate) subscribers: Vec<Subscriber>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: Vec::new(),
        }
    }

    /// Append a subscriber. Duplicates are allowed.
    pub(crate) fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    /// Remove every entry for `consumer` together with any expired entry.
    /// Returns how many entries were removed.
    pub(crate) fn unsubscribe<C: ?Sized>(&mut self, consumer: &Arc<C>) -> usize {
        let before = self.subscribers.len();
        self.subscribers
            .retain(|sub| !sub.is_expired() && !sub.is(consumer));
        before - self.subscribers.len()
    }

    /// Remove the entry issued for `id`, pruning expired entries on the way.
    /// Returns whether `id` was present.
    pub(crate) fn cancel(&mut self, id: SubscriptionId) -> bool {
        let mut found = false;
        self.subscribers.retain(|sub| {
            if sub.id == id {
                found = true;
                return false;
            }
            !sub.is_expired()
        });
        found
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
