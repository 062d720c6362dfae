//! Parsing of sample input
//!
//! Accepts a full `trend.sample_batch.v1` envelope, a bare JSON array of
//! samples, or NDJSON with one sample per line.

use crate::error::ComputeError;
use crate::schema::batch::*;
use crate::types::Sample;

/// Adapter for reading samples from JSON input
pub struct SampleAdapter;

impl SampleAdapter {
    /// Parse a `trend.sample_batch.v1` envelope
    pub fn parse_batch(json: &str) -> Result<SampleBatch, ComputeError> {
        let batch: SampleBatch = serde_json::from_str(json)?;
        batch
            .validate()
            .map_err(|e| ComputeError::ValidationFailed(e.to_string()))?;
        Ok(batch)
    }

    /// Parse a JSON string containing an array of samples
    pub fn parse_array(json: &str) -> Result<Vec<Sample>, ComputeError> {
        let samples: Vec<Sample> = serde_json::from_str(json)?;
        Ok(samples)
    }

    /// Parse NDJSON (newline-delimited JSON) containing samples
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<Sample>, ComputeError> {
        let mut samples = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Sample>(trimmed) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(samples)
    }

    /// Parse either an envelope or a bare array, whichever the input holds
    pub fn parse_any(json: &str) -> Result<SampleBatch, ComputeError> {
        if json.trim_start().starts_with('[') {
            Ok(SampleBatch::new(Self::parse_array(json)?))
        } else {
            Self::parse_batch(json)
        }
    }

    /// Validate a batch of samples, returning only the failures
    pub fn validate_samples(samples: &[Sample]) -> Vec<ValidationResult> {
        samples
            .iter()
            .enumerate()
            .filter_map(|(idx, sample)| {
                validate_sample(sample).err().map(|error| ValidationResult {
                    index: idx,
                    error,
                })
            })
            .collect()
    }
}

/// A sample that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub error: ValidationError,
}
