use crate::{
    coerce::CoercionError,
    config::{ConfigError, EngineConfig},
};
use time::{
    PrimitiveDateTime,
    format_description::{self, OwnedFormatItem},
    macros::format_description,
};

///
/// FormatContext
///
/// Date rendering and parsing patterns for one logical task.
/// Built per session and never shared mutably between tasks.
///

#[derive(Clone, Debug)]
pub struct FormatContext {
    date: OwnedFormatItem,
    date_time: OwnedFormatItem,
}

impl FormatContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            date: format_description!("[year]-[month]-[day]").into(),
            date_time: format_description!("[year]-[month]-[day] [hour]:[minute]:[second]").into(),
        }
    }

    /// Build from configured patterns (time format description syntax).
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            date: parse_pattern("date_format", &config.date_format)?,
            date_time: parse_pattern("date_time_format", &config.date_time_format)?,
        })
    }

    /// Render a date, with or without its time of day.
    pub fn format(&self, value: PrimitiveDateTime, show_time: bool) -> Result<String, CoercionError> {
        let pattern = if show_time {
            &self.date_time
        } else {
            &self.date
        };

        value
            .format(pattern)
            .map_err(|err| CoercionError::Format(err.to_string()))
    }

    /// Parse text as a date-time first, then as a date at midnight.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<PrimitiveDateTime> {
        PrimitiveDateTime::parse(text, &self.date_time)
            .ok()
            .or_else(|| {
                time::Date::parse(text, &self.date)
                    .ok()
                    .map(time::Date::midnight)
            })
    }
}

impl Default for FormatContext {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_pattern(which: &'static str, pattern: &str) -> Result<OwnedFormatItem, ConfigError> {
    format_description::parse_owned::<1>(pattern).map_err(|err| ConfigError::InvalidPattern {
        which,
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}
