//! trend.sample_batch.v1 schema definition
//!
//! A batch of already-fetched samples for one data type, as delivered by a
//! sample store or sync endpoint.

use serde::{Deserialize, Serialize};

use crate::types::Sample;

/// Current batch schema version
pub const SCHEMA_VERSION: &str = "trend.sample_batch.v1";

/// A batch of samples sharing one data type and unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleBatch {
    /// Schema version identifier
    pub schema_version: String,
    /// Measured quantity (e.g. "walking_speed", "six_minute_walk_distance")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Unit of every value in the batch (e.g. "m/s")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Samples in any order
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl SampleBatch {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            data_type: None,
            unit: None,
            samples,
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Validate the batch envelope
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }
        Ok(())
    }
}

/// Check a single sample
pub fn validate_sample(sample: &Sample) -> Result<(), ValidationError> {
    if sample.end_time < sample.start_time {
        return Err(ValidationError::EndBeforeStart {
            start: sample.start_time.to_rfc3339(),
            end: sample.end_time.to_rfc3339(),
        });
    }
    if !sample.value.is_finite() {
        return Err(ValidationError::NonFiniteValue(sample.value.to_string()));
    }
    Ok(())
}

/// Validation errors for sample batches
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Sample ends before it starts: {start} > {end}")]
    EndBeforeStart { start: String, end: String },

    #[error("Sample value is not finite: {0}")]
    NonFiniteValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_serialize_batch() {
        let at = Utc.with_ymd_and_hms(2020, 6, 10, 8, 0, 0).unwrap();
        let batch = SampleBatch::new(vec![Sample::instant(at, 1.25)])
            .with_data_type("walking_speed")
            .with_unit("m/s");

        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.contains(r#""schema_version":"trend.sample_batch.v1""#));
        assert!(json.contains(r#""unit":"m/s""#));

        let parsed: SampleBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.samples, batch.samples);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_wrong_schema_version() {
        let mut batch = SampleBatch::new(Vec::new());
        batch.schema_version = "wear.raw_event.v1".to_string();

        assert!(matches!(
            batch.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_validate_sample() {
        let start = Utc.with_ymd_and_hms(2020, 6, 10, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 6, 10, 9, 0, 0).unwrap();

        assert!(validate_sample(&Sample::new(start, end, 1.0)).is_ok());
        assert!(matches!(
            validate_sample(&Sample::new(end, start, 1.0)),
            Err(ValidationError::EndBeforeStart { .. })
        ));
        assert!(matches!(
            validate_sample(&Sample::new(start, end, f64::NAN)),
            Err(ValidationError::NonFiniteValue(_))
        ));
    }
}
