use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for both the broker simulator and the consumer pipeline.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub simulator: SimulatorSettings,
    pub consumer: ConsumerSettings,
}

/// Configuration settings for the broker simulator.
///
/// Controls the capacity of the bounded mailbox feeding the dispatch worker.
#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorSettings {
    pub mailbox_capacity: usize,
}

/// Configuration settings for the consumer pipeline.
///
/// Defines the content type assumed for messages that do not declare one.
#[derive(Debug, Deserialize, Clone)]
pub struct ConsumerSettings {
    pub default_content_type: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulator: SimulatorSettings {
                mailbox_capacity: 100,
            },
            consumer: ConsumerSettings {
                default_content_type: "application/json".to_string(),
            },
        }
    }
}

/// Partial mirror of [`Settings`] used while merging configuration sources
/// over the defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub simulator: Option<PartialSimulatorSettings>,
    pub consumer: Option<PartialConsumerSettings>,
}

#[derive(Debug, PartialEq, Deserialize)]
pub struct PartialSimulatorSettings {
    pub mailbox_capacity: Option<usize>,
}

#[derive(Debug, PartialEq, Deserialize)]
pub struct PartialConsumerSettings {
    pub default_content_type: Option<String>,
}
