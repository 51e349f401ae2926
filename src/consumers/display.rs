use std::sync::Mutex;

use tracing::debug;

use super::game::GameState;

/// Renders the game. Called from whichever producer thread drove the state
/// change, so implementations must be thread-safe. The game state lock is
/// held during `draw`; implementations must not call back into the game.
pub trait Display: Send + Sync {
    fn draw(&self, state: &GameState);
}

/// Writes each frame to the log instead of a panel.
#[derive(Debug, Default)]
pub struct TracingDisplay;

impl Display for TracingDisplay {
    fn draw(&self, state: &GameState) {
        debug!(
            ball_x = state.ball_x,
            ball_y = state.ball_y,
            score = state.score,
            "frame"
        );
    }
}

/// Keeps every frame in memory; handy for inspecting a run.
#[derive(Debug, Default)]
pub struct FrameLog {
    frames: Mutex<Vec<GameState>>,
}

impl FrameLog {
    pub fn frames(&self) -> Vec<GameState> {
        self.frames
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<GameState> {
        self.frames
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .copied()
    }
}

impl Display for FrameLog {
    fn draw(&self, state: &GameState) {
        self.frames
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(*state);
    }
}
