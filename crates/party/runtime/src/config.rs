//! Configuration for the party runtime

use party_types::PartySettings;
use serde::{Deserialize, Serialize};

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyConfig {
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Membership bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Minimum active members before preference collection may start
    #[serde(default = "default_min_members")]
    pub default_min_members: u32,

    /// Member capacity for parties created without explicit settings
    #[serde(default = "default_max_members")]
    pub default_max_members: u32,

    /// Ceiling no party may exceed
    #[serde(default = "default_hard_max_members")]
    pub hard_max_members: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_min_members: default_min_members(),
            default_max_members: default_max_members(),
            hard_max_members: default_hard_max_members(),
        }
    }
}

/// Candidate generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Size of the candidate set handed to every party
    #[serde(default = "default_candidate_count")]
    pub candidate_count: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            candidate_count: default_candidate_count(),
        }
    }
}

/// Change notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Broadcast buffer; slow subscribers lag past this
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_min_members() -> u32 {
    2
}

fn default_max_members() -> u32 {
    8
}

fn default_hard_max_members() -> u32 {
    64
}

fn default_candidate_count() -> usize {
    10
}

fn default_channel_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PartyConfig {
    /// Load configuration: defaults, then the optional file, then `PARTY_*`
    /// environment variables (`PARTY_LIMITS__DEFAULT_MAX_MEMBERS=12`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&PartyConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PARTY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: PartyConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let limits = &self.limits;
        if limits.default_min_members < 1 {
            return Err(config::ConfigError::Message(
                "limits.default_min_members must be at least 1".into(),
            ));
        }
        if limits.default_max_members < limits.default_min_members {
            return Err(config::ConfigError::Message(
                "limits.default_max_members is below limits.default_min_members".into(),
            ));
        }
        if limits.hard_max_members < limits.default_max_members {
            return Err(config::ConfigError::Message(
                "limits.hard_max_members is below limits.default_max_members".into(),
            ));
        }
        if self.generation.candidate_count == 0 {
            return Err(config::ConfigError::Message(
                "generation.candidate_count must be positive".into(),
            ));
        }
        if self.events.channel_capacity == 0 {
            return Err(config::ConfigError::Message(
                "events.channel_capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Settings for a party created without explicit bounds.
    pub fn default_settings(&self, name: Option<String>) -> PartySettings {
        PartySettings {
            name,
            min_members: self.limits.default_min_members,
            max_members: self.limits.default_max_members,
        }
    }
}
