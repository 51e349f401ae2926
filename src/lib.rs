//! # balance-bus
//!
//! `balance-bus` is the in-process publish/subscribe backbone of the balance
//! ball board: sensor threads publish accelerometer samples and button
//! events, and the game, logger and LED consume them.
//!
//! ## Core Modules
//!
//! - `broker`: the thread-safe broker, the `Message` value with its payload
//!   encodings and the `Consumer` capability.
//! - `producers`: sensor sources and the threads that poll and publish them.
//! - `consumers`: the ball game, message logger and LED actuator.
//! - `config`: loading and merging application settings.
//! - `utils`: error types and logging initialisation.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use balance_bus::broker::{Broker, Consumer, Message};
//!
//! struct Print;
//!
//! impl Consumer for Print {
//!     fn on_message(&self, msg: &Message) {
//!         println!("[{}] {}", msg.topic(), msg.payload());
//!     }
//! }
//!
//! let broker = Broker::new();
//! let print = Arc::new(Print);
//! broker.subscribe("btn", &print);
//! let delivery = broker.publish(Message::new("btn", "27,0"));
//! assert_eq!(delivery.delivered, 1);
//! ```

pub mod broker;
pub mod config;
pub mod consumers;
pub mod producers;
pub mod utils;
