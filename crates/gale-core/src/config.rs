use core::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::sensors::AnemometerCalibration;

/// Seconds between uploads on the stock station
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Feed group holding the station's temperature, pressure and wind speed feeds
pub const DEFAULT_FEED_GROUP: &str = "weatherstation";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, bound(deserialize = "'de: 'a"))]
pub struct StationConfig<'a> {
    /// Pause after a successful upload, in seconds
    pub refresh_interval_secs: u64,
    /// Name of the remote feed group resolved at startup
    pub feed_group: &'a str,
    pub anemometer: AnemometerCalibration,
}

impl Default for StationConfig<'_> {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            feed_group: DEFAULT_FEED_GROUP,
            anemometer: AnemometerCalibration::default(),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("refresh interval must be at least one second")]
    ZeroRefreshInterval,
    #[error("feed group name is empty")]
    EmptyFeedGroup,
    #[error("anemometer calibration has an empty voltage range")]
    DegenerateCalibration,
}

impl StationConfig<'_> {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Reject settings the poll loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::ZeroRefreshInterval);
        }
        if self.feed_group.is_empty() {
            return Err(ConfigError::EmptyFeedGroup);
        }
        if self.anemometer.is_degenerate() {
            return Err(ConfigError::DegenerateCalibration);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_station() {
        let config = StationConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.feed_group, "weatherstation");
        assert_eq!(config.anemometer.max_speed, 32.4);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "refresh_interval_secs": 60, "anemometer": { "divider_gain": 2.0 } }"#;
        let config: StationConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.feed_group, DEFAULT_FEED_GROUP);
        assert_eq!(config.anemometer.divider_gain, 2.0);
        assert_eq!(config.anemometer.min_volts, 0.4);
    }

    #[test]
    fn test_feed_group_borrows_from_input() {
        let json = r#"{ "feed_group": "rooftop" }"#;
        let config: StationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.feed_group, "rooftop");
    }

    #[test]
    fn test_validate_rejects_unusable_settings() {
        let zero = StationConfig {
            refresh_interval_secs: 0,
            ..StationConfig::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroRefreshInterval));

        let unnamed = StationConfig {
            feed_group: "",
            ..StationConfig::default()
        };
        assert_eq!(unnamed.validate(), Err(ConfigError::EmptyFeedGroup));

        let mut flat = StationConfig::default();
        flat.anemometer.max_volts = flat.anemometer.min_volts;
        assert_eq!(flat.validate(), Err(ConfigError::DegenerateCalibration));
    }
}
