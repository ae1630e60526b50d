use crate::coerce::FormatContext;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

pub const DEFAULT_DATE_FORMAT: &str = "[year]-[month]-[day]";
pub const DEFAULT_DATE_TIME_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Toml(String),

    #[error("invalid {which} pattern '{pattern}': {message}")]
    InvalidPattern {
        which: &'static str,
        pattern: String,
        message: String,
    },
}

///
/// EngineConfig
///
/// Engine-wide settings loaded from toml.
/// Patterns use the `time` format description syntax.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub date_format: String,
    pub date_time_format: String,
    pub debug: bool,
}

impl EngineConfig {
    /// Parse and validate a toml document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|err| ConfigError::Toml(err.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Check that both patterns parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        FormatContext::from_config(self).map(|_| ())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|err| ConfigError::Toml(err.to_string()))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
            debug: false,
        }
    }
}
