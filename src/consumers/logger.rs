use std::str::FromStr;

use tracing::{info, warn};

use crate::broker::{Consumer, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `[topic] payload`
    #[default]
    Plain,
    /// The message serialized as JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Logs every message it receives.
#[derive(Debug, Default)]
pub struct Logger {
    format: LogFormat,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, message: &Message) -> String {
        match self.format {
            LogFormat::Plain => format!("[{}] {}", message.topic(), message.payload()),
            LogFormat::Json => message.to_json().unwrap_or_else(|e| {
                warn!(error = %e, "failed to serialize message");
                format!("[{}] {}", message.topic(), message.payload())
            }),
        }
    }
}

impl Consumer for Logger {
    fn on_message(&self, message: &Message) {
        info!("{}", self.render(message));
    }

    fn name(&self) -> &str {
        "logger"
    }
}
