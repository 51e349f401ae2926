//! The `consumers` module holds the subscribers wired up by the application:
//! the ball game, the message logger and the LED actuator, plus the
//! [`Display`] the game draws on.

pub mod display;
pub mod game;
pub mod led;
pub mod logger;

pub use display::{Display, FrameLog, TracingDisplay};
pub use game::{BALL_SIZE, GameControl, GameState};
pub use led::Led;
pub use logger::{LogFormat, Logger};
