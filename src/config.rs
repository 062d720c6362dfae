//! Chart configuration
//!
//! Settings shared by every aggregation a [`ChartProcessor`](crate::ChartProcessor)
//! runs. Configuration is read once and never mutated by processing.

use serde::{Deserialize, Serialize};

use crate::types::{ChartTimezone, Granularity};

/// Configuration for chart processing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Timezone for every calendar derivation; the host's local timezone
    /// unless overridden
    pub timezone: ChartTimezone,
    /// Drop samples outside the chart's trailing window before aggregating
    pub apply_query_window: bool,
    /// Granularity used when a caller does not pick one
    pub default_granularity: Granularity,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            timezone: ChartTimezone::Local,
            apply_query_window: true,
            default_granularity: Granularity::Daily,
        }
    }
}

impl ChartConfig {
    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_timezone(mut self, timezone: ChartTimezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_query_window(mut self, apply: bool) -> Self {
        self.apply_query_window = apply;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_follows_host_timezone() {
        let config = ChartConfig::default();

        assert_eq!(config.timezone, ChartTimezone::Local);
        assert_eq!(ChartConfig::from_json("{}").unwrap().timezone, ChartTimezone::Local);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ChartConfig::from_json(r#"{"timezone": "-04:00"}"#).unwrap();

        assert_eq!(config.timezone.to_string(), "-04:00");
        assert!(config.apply_query_window);
        assert_eq!(config.default_granularity, Granularity::Daily);
    }

    #[test]
    fn test_serialization() {
        let config = ChartConfig::default()
            .with_query_window(false)
            .with_timezone(ChartTimezone::Utc);

        let json = config.to_json().unwrap();
        let loaded = ChartConfig::from_json(&json).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        assert!(ChartConfig::from_json(r#"{"timezone": "Europe/Paris"}"#).is_err());
    }
}
