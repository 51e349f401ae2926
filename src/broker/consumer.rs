//! Consumer capability and subscription handles
//!
//! Every subscriber implements [`Consumer`]. The broker only ever stores a
//! `Weak` to it, so a consumer lives exactly as long as its owner keeps an
//! `Arc` around; dropping the last `Arc` silently ends delivery.

use std::sync::atomic::{AtomicU64, Ordering};

use super::message::Message;

/// Receives messages for the topics it is subscribed to.
///
/// `on_message` runs synchronously on whichever thread called
/// [`Broker::publish`](super::Broker::publish), so it may be invoked
/// concurrently from different producer threads. It may call back into the
/// broker (publish, subscribe, unsubscribe).
///
/// A panic inside `on_message` is caught by the broker and reported; it does
/// not stop delivery to the remaining subscribers.
pub trait Consumer: Send + Sync {
    fn on_message(&self, message: &Message);

    /// Name used in logs when dispatch to this consumer fails.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Process-unique identifier of a single `subscribe` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Handle returned by [`Broker::subscribe`](super::Broker::subscribe).
///
/// It is a lookup key, not an owner: dropping it does not unsubscribe.
/// Pass it to [`Broker::cancel`](super::Broker::cancel) to remove exactly
/// the entry it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub(crate) topic: String,
    pub(crate) id: SubscriptionId,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}
