mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ConsumerSettings, Settings, SimulatorSettings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the simulator and consumer configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        simulator: SimulatorSettings {
            mailbox_capacity: partial
                .simulator
                .as_ref()
                .and_then(|s| s.mailbox_capacity)
                .unwrap_or(default.simulator.mailbox_capacity),
        },
        consumer: ConsumerSettings {
            default_content_type: partial
                .consumer
                .as_ref()
                .and_then(|c| c.default_content_type.clone())
                .unwrap_or(default.consumer.default_content_type),
        },
    })
}
