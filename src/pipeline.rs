//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Trend.
//! It orchestrates the full path from a raw sample batch to chart JSON.

use chrono::{DateTime, Utc};

use crate::aligner::{Aggregation, SeriesAligner};
use crate::config::ChartConfig;
use crate::encoder::{ChartContext, ChartEncoder};
use crate::error::ComputeError;
use crate::query::QueryWindow;
use crate::schema::{validate_sample, SampleAdapter, SampleBatch};
use crate::types::{ChartPayload, Granularity, Orientation, Sample};

/// Convert a raw sample batch into chart payload JSON.
///
/// # Arguments
/// * `raw_json` - A `trend.sample_batch.v1` envelope or a bare sample array
/// * `granularity` - Calendar unit to bucket by
/// * `reference` - Instant the axis ends at, usually "now"
///
/// # Example
/// ```ignore
/// let chart_json = samples_to_chart(batch_json, Granularity::Daily, Utc::now())?;
/// ```
pub fn samples_to_chart(
    raw_json: String,
    granularity: Granularity,
    reference: DateTime<Utc>,
) -> Result<String, ComputeError> {
    ChartProcessor::new().process(&raw_json, granularity, reference)
}

/// Processor for chart requests.
///
/// Carries configuration and an encoder identity only. Every request is
/// aggregated from scratch, so a processor can be shared freely.
pub struct ChartProcessor {
    config: ChartConfig,
    aligner: SeriesAligner,
    encoder: ChartEncoder,
}

impl Default for ChartProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_config(ChartConfig::default())
    }

    /// Create a processor with explicit configuration
    pub fn with_config(config: ChartConfig) -> Self {
        Self {
            config,
            aligner: SeriesAligner::new(config.timezone),
            encoder: ChartEncoder::new(),
        }
    }

    /// Create a processor from JSON configuration
    pub fn from_config_json(json: &str) -> Result<Self, ComputeError> {
        let config =
            ChartConfig::from_json(json).map_err(|e| ComputeError::ParseError(e.to_string()))?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Aggregate samples, applying the trailing window when configured.
    ///
    /// Samples that fail validation are dropped rather than failing the
    /// whole chart.
    pub fn aggregate(
        &self,
        samples: &[Sample],
        granularity: Granularity,
        reference: DateTime<Utc>,
    ) -> Aggregation {
        let mut retained: Vec<Sample> = samples
            .iter()
            .filter(|s| validate_sample(s).is_ok())
            .copied()
            .collect();
        if retained.len() < samples.len() {
            tracing::warn!(
                count = samples.len() - retained.len(),
                "dropping invalid samples"
            );
        }

        if self.config.apply_query_window {
            let window = QueryWindow::trailing(granularity, reference);
            let before = retained.len();
            retained = window.filter(&retained);
            tracing::debug!(
                kept = retained.len(),
                dropped = before - retained.len(),
                start = %window.start,
                end = %window.end,
                "applied query window"
            );
        }

        self.aligner.aggregate(&retained, granularity, &reference)
    }

    /// Build a chart payload from a parsed batch
    pub fn chart(
        &self,
        batch: &SampleBatch,
        granularity: Granularity,
        reference: DateTime<Utc>,
    ) -> ChartPayload {
        let aggregation = self.aggregate(&batch.samples, granularity, reference);
        let context = ChartContext {
            reference,
            timezone: self.config.timezone,
            sample_count: batch.samples.len(),
            data_type: batch.data_type.as_deref(),
            unit: batch.unit.as_deref(),
        };
        self.encoder.encode(&aggregation, &context)
    }

    /// Process raw batch JSON into chart payload JSON
    pub fn process(
        &self,
        raw_json: &str,
        granularity: Granularity,
        reference: DateTime<Utc>,
    ) -> Result<String, ComputeError> {
        let batch = SampleAdapter::parse_any(raw_json)?;
        let payload = self.chart(&batch, granularity, reference);
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }

    /// Process using the configured default granularity
    pub fn process_default(
        &self,
        raw_json: &str,
        reference: DateTime<Utc>,
    ) -> Result<String, ComputeError> {
        self.process(raw_json, self.config.default_granularity, reference)
    }

    /// Process for a chart picker segment at the given orientation
    pub fn process_segment(
        &self,
        raw_json: &str,
        segment: usize,
        orientation: Orientation,
        reference: DateTime<Utc>,
    ) -> Result<String, ComputeError> {
        let granularity = Granularity::from_segment(segment, orientation).ok_or_else(|| {
            ComputeError::InvalidGranularity(format!("no chart for segment {segment}"))
        })?;
        self.process(raw_json, granularity, reference)
    }
}
