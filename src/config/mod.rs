mod settings;

use std::path::Path;

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{
    AccelerometerSettings, ButtonSettings, GameSettings, LedSettings, LoggingSettings, Settings,
};

/// Prefix of the environment overrides, e.g. `BALLBUS__GAME__SPEED=3`.
pub const ENV_PREFIX: &str = "BALLBUS";

/// Loads the configuration from `config/default` and environment variables.
/// Merges the configuration with default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(Path::new("config/default"), false)
}

/// Loads the configuration from `path` (any format the `config` crate
/// recognises by extension), then environment variables, then defaults.
///
/// A missing file is an error only when `required` is set. The merged
/// settings are checked with [`Settings::validate`].
pub fn load_config_from(path: &Path, required: bool) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::from(path).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let settings = partial.merge_onto(Settings::default());
    settings.validate()?;
    Ok(settings)
}
