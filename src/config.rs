use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::predict::{ApproachSearch, GeodeticCoordinate};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub satellite: SatelliteConfig,
    pub target: TargetConfig,
    pub search: SearchConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SatelliteConfig {
    pub catalog_id: u32,
    /// Used as the name line when the source does not provide one.
    pub name: String,
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            catalog_id: 49260,
            name: "LANDSAT 9".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub height_km: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            latitude_deg: 16.043,
            longitude_deg: 45.703,
            height_km: 0.0,
        }
    }
}

impl TargetConfig {
    pub fn coordinate(&self) -> GeodeticCoordinate {
        GeodeticCoordinate::from_degrees(self.latitude_deg, self.longitude_deg, self.height_km)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub step_millis: u64,
    pub max_steps: usize,
    pub max_element_age_days: i64,
    pub workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            step_millis: 60 * 1000,
            // 16 days of one-minute steps
            max_steps: 23040,
            max_element_age_days: 30,
            workers: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: 10,
        }
    }
}

fn default_base_url() -> String {
    "https://tle.ivanstanojevic.me/api/tle".to_string()
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, message: &str| ConfigError::Invalid {
            field,
            message: message.to_string(),
        };

        if !(-90.0..=90.0).contains(&self.target.latitude_deg) {
            return Err(invalid("target.latitude_deg", "must be within [-90, 90]"));
        }
        if !self.target.longitude_deg.is_finite() || !self.target.height_km.is_finite() {
            return Err(invalid("target", "coordinates must be finite"));
        }
        if self.search.step_millis == 0 {
            return Err(invalid("search.step_millis", "must be greater than zero"));
        }
        if self.search.max_steps == 0 {
            return Err(invalid("search.max_steps", "must be greater than zero"));
        }
        if self.search.workers == 0 {
            return Err(invalid("search.workers", "must be greater than zero"));
        }
        if self.search.max_element_age_days <= 0 {
            return Err(invalid(
                "search.max_element_age_days",
                "must be greater than zero",
            ));
        }
        self.max_element_age()?;
        Ok(())
    }

    pub fn approach_search(&self) -> ApproachSearch {
        ApproachSearch {
            target: self.target.coordinate(),
            step_millis: self.search.step_millis,
            max_steps: self.search.max_steps,
            workers: self.search.workers,
        }
    }

    pub fn max_element_age(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_days(self.search.max_element_age_days).ok_or_else(|| {
            ConfigError::Invalid {
                field: "search.max_element_age_days",
                message: format!("{} days is out of range", self.search.max_element_age_days),
            }
        })
    }
}
