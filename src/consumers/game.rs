//! Ball game driven by the sensor topics.
//!
//! - `accl`: the ball rolls by `round(axis * speed)` pixels per sample and the
//!   score grows by one for every sample the ball stays on screen. Leaving
//!   the screen re-centres the ball and raises a `boundary` event.
//! - `btn`: a press (value `0`) resets ball and score.
//! - `boundary`: payload `"1"` costs `boundary_penalty` points.
//!
//! The `boundary` event goes through the broker like any other message, so it
//! is published from inside `on_message`. The state lock is released before
//! that happens because the same controller receives the event re-entrantly.
//! Frames are drawn with the lock held, so the display sees states in the
//! order they were produced even when `accl` and `btn` race.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, trace, warn};

use crate::broker::message::{
    TOPIC_ACCEL, TOPIC_BOUNDARY, TOPIC_BUTTON, decode_accel, decode_button,
};
use crate::broker::{Broker, Consumer, Message};
use crate::config::GameSettings;

use super::display::Display;

/// Width and height of the ball bitmap in pixels.
pub const BALL_SIZE: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub ball_x: i32,
    pub ball_y: i32,
    pub score: i64,
}

pub struct GameControl {
    broker: Arc<Broker>,
    display: Arc<dyn Display>,
    settings: GameSettings,
    state: Mutex<GameState>,
}

impl GameControl {
    /// Creates the controller with the ball centred and draws the first frame.
    pub fn new(broker: Arc<Broker>, display: Arc<dyn Display>, settings: GameSettings) -> Self {
        let (ball_x, ball_y) = centre(&settings);
        let state = GameState {
            ball_x,
            ball_y,
            score: 0,
        };
        display.draw(&state);

        Self {
            broker,
            display,
            settings,
            state: Mutex::new(state),
        }
    }

    pub fn state(&self) -> GameState {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_screen(&self, state: &GameState) -> bool {
        let max_x = self.settings.width - BALL_SIZE;
        let max_y = self.settings.height - BALL_SIZE;
        (0..=max_x).contains(&state.ball_x) && (0..=max_y).contains(&state.ball_y)
    }

    fn handle_accel(&self, payload: &str) {
        let (x, y, _z) = match decode_accel(payload) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(payload, error = %e, "dropping malformed accelerometer sample");
                return;
            }
        };
        let speed = f64::from(self.settings.speed);

        let (frame, left_screen) = {
            let mut state = self.lock();
            state.ball_x = state.ball_x.saturating_add((x * speed).round() as i32);
            state.ball_y = state.ball_y.saturating_add((y * speed).round() as i32);

            let left_screen = !self.on_screen(&state);
            if left_screen {
                (state.ball_x, state.ball_y) = centre(&self.settings);
            } else {
                state.score += 1;
            }
            self.display.draw(&state);
            (*state, left_screen)
        };

        if left_screen {
            info!(score = frame.score, "ball left the screen");
            self.broker.publish(Message::new(TOPIC_BOUNDARY, "1"));
        }
    }

    fn handle_button(&self, payload: &str) {
        let (gpio, value) = match decode_button(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(payload, error = %e, "dropping malformed button event");
                return;
            }
        };
        if value != 0 {
            trace!(gpio, "button released");
            return;
        }

        info!(gpio, "RESET");
        let mut state = self.lock();
        (state.ball_x, state.ball_y) = centre(&self.settings);
        state.score = 0;
        self.display.draw(&state);
    }

    fn handle_boundary(&self, payload: &str) {
        if payload.trim() != "1" {
            debug!(payload, "ignoring boundary event");
            return;
        }

        let mut state = self.lock();
        state.score -= self.settings.boundary_penalty;
        self.display.draw(&state);
    }
}

impl Consumer for GameControl {
    fn on_message(&self, message: &Message) {
        match message.topic() {
            TOPIC_ACCEL => self.handle_accel(message.payload()),
            TOPIC_BUTTON => self.handle_button(message.payload()),
            TOPIC_BOUNDARY => self.handle_boundary(message.payload()),
            other => trace!(topic = other, "game ignores topic"),
        }
    }

    fn name(&self) -> &str {
        "game-control"
    }
}

fn centre(settings: &GameSettings) -> (i32, i32) {
    (settings.width / 2, settings.height / 2)
}
