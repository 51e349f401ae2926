//! The `broker` module is the in-process publish/subscribe core: the
//! [`Message`] value, the [`Consumer`] capability and the [`Broker`] that
//! routes one to the other.

pub mod consumer;
pub mod engine;
pub mod message;
pub mod topic;

pub use consumer::{Consumer, Subscription, SubscriptionId};
pub use engine::{Broker, Delivery};
pub use message::Message;
