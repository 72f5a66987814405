//! Planner configuration.
//!
//! Passed explicitly into every planning request. Every field has a default,
//! so a config file only needs to name what it changes.

use std::path::Path;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::distance_api::DistanceApiConfig;
use crate::error::ConfigError;
use crate::model::{TimeWindow, hhmm};

/// Environment variable consulted for the distance API key.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Departure time from the origin, `"HH:MM"`.
    #[serde(with = "hhmm")]
    pub departure_time: NaiveTime,
    pub default_work_minutes: u32,
    pub lunch: TimeWindow,
    /// Most stops one day may hold.
    pub max_stops: usize,
    /// Distance API credential. Without one every request uses the fallback.
    pub api_key: Option<String>,
    pub distance_api: DistanceApiConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            departure_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            default_work_minutes: 15,
            lunch: TimeWindow {
                start: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
                end: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default(),
            },
            max_stops: 30,
            api_key: None,
            distance_api: DistanceApiConfig::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_json(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text, &path.display().to_string())
    }

    /// Replace the credential. Blank keys clear it.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    /// Take the credential from [`API_KEY_ENV`] when the config has none.
    pub fn with_env_api_key(self) -> Self {
        if self.api_key.is_some() {
            return self;
        }
        let key = std::env::var(API_KEY_ENV).ok();
        self.with_api_key(key)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lunch.start >= self.lunch.end {
            return Err(ConfigError::Invalid(format!(
                "lunch must end after it starts, got {}",
                self.lunch
            )));
        }
        if self.default_work_minutes == 0 {
            return Err(ConfigError::Invalid("default_work_minutes must be at least 1".to_string()));
        }
        if self.distance_api.batch_size == 0 {
            return Err(ConfigError::Invalid("distance_api.batch_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
