use config::ConfigError;
use serde::Deserialize;

use crate::consumers::BALL_SIZE;

/// Top-level configuration settings for the application.
///
/// Covers logging, the two sensor producers, the game and the LED actuator.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub accelerometer: AccelerometerSettings,
    pub button: ButtonSettings,
    pub game: GameSettings,
    pub led: LedSettings,
}

/// Log level plus the output format of the message logger consumer
/// (`plain` or `json`).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccelerometerSettings {
    pub poll_interval_ms: u64,
}

/// Button producer settings.
///
/// With `device` unset a simulated button is used. It reads pressed for one
/// poll out of every `press_every` and released otherwise.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ButtonSettings {
    pub gpio: i32,
    pub poll_interval_ms: u64,
    pub device: Option<String>,
    pub press_every: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GameSettings {
    pub speed: i32,
    pub width: i32,
    pub height: i32,
    pub boundary_penalty: i64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LedSettings {
    pub device: Option<String>,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub logging: Option<PartialLoggingSettings>,
    pub accelerometer: Option<PartialAccelerometerSettings>,
    pub button: Option<PartialButtonSettings>,
    pub game: Option<PartialGameSettings>,
    pub led: Option<PartialLedSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialAccelerometerSettings {
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialButtonSettings {
    pub gpio: Option<i32>,
    pub poll_interval_ms: Option<u64>,
    pub device: Option<String>,
    pub press_every: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PartialGameSettings {
    pub speed: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub boundary_penalty: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLedSettings {
    pub device: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Matches the balance-ball board: a 128x32 OLED, the button on GPIO 27 and
/// the accelerometer sampled every 100 ms.
impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingSettings {
                level: "info".to_string(),
                format: "plain".to_string(),
            },
            accelerometer: AccelerometerSettings {
                poll_interval_ms: 100,
            },
            button: ButtonSettings {
                gpio: 27,
                poll_interval_ms: 200,
                device: None,
                press_every: 25,
            },
            game: GameSettings {
                speed: 2,
                width: 128,
                height: 32,
                boundary_penalty: 1000,
            },
            led: LedSettings { device: None },
        }
    }
}

impl Settings {
    /// Rejects values the producers and the game cannot run with: a zero
    /// poll interval or a screen smaller than the ball.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accelerometer.poll_interval_ms == 0 {
            return Err(invalid("accelerometer.poll_interval_ms must be positive"));
        }
        if self.button.poll_interval_ms == 0 {
            return Err(invalid("button.poll_interval_ms must be positive"));
        }
        if self.game.width < BALL_SIZE || self.game.height < BALL_SIZE {
            return Err(invalid(format!(
                "game screen {}x{} is smaller than the {BALL_SIZE}px ball",
                self.game.width, self.game.height
            )));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Message(reason.into())
}

impl PartialSettings {
    /// Overlay the values that were provided onto `base`.
    pub fn merge_onto(self, base: Settings) -> Settings {
        let Settings {
            logging,
            accelerometer,
            button,
            game,
            led,
        } = base;

        let logging = match self.logging {
            Some(p) => LoggingSettings {
                level: p.level.unwrap_or(logging.level),
                format: p.format.unwrap_or(logging.format),
            },
            None => logging,
        };
        let accelerometer = match self.accelerometer {
            Some(p) => AccelerometerSettings {
                poll_interval_ms: p.poll_interval_ms.unwrap_or(accelerometer.poll_interval_ms),
            },
            None => accelerometer,
        };
        let button = match self.button {
            Some(p) => ButtonSettings {
                gpio: p.gpio.unwrap_or(button.gpio),
                poll_interval_ms: p.poll_interval_ms.unwrap_or(button.poll_interval_ms),
                device: p.device.or(button.device),
                press_every: p.press_every.unwrap_or(button.press_every),
            },
            None => button,
        };
        let game = match self.game {
            Some(p) => GameSettings {
                speed: p.speed.unwrap_or(game.speed),
                width: p.width.unwrap_or(game.width),
                height: p.height.unwrap_or(game.height),
                boundary_penalty: p.boundary_penalty.unwrap_or(game.boundary_penalty),
            },
            None => game,
        };
        let led = match self.led {
            Some(p) => LedSettings {
                device: p.device.or(led.device),
            },
            None => led,
        };

        Settings {
            logging,
            accelerometer,
            button,
            game,
            led,
        }
    }
}
