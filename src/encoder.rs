//! Chart payload encoding
//!
//! This module encodes an aggregation into a `trend.chart_series.v1` payload
//! carrying the aligned points plus the header labels a chart needs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aligner::Aggregation;
use crate::error::ComputeError;
use crate::labels::{label_to_instant, last_updated_label, weekly_date_range_label};
use crate::types::{ChartPayload, ChartPoint, ChartProducer, ChartTimezone};
use crate::{PRODUCER_NAME, TREND_VERSION};

/// Current chart payload schema version
pub const CHART_SCHEMA_VERSION: &str = "trend.chart_series.v1";

/// Everything about a chart request that is not part of the aggregation
#[derive(Debug, Clone)]
pub struct ChartContext<'a> {
    pub reference: DateTime<Utc>,
    pub timezone: ChartTimezone,
    pub sample_count: usize,
    pub data_type: Option<&'a str>,
    pub unit: Option<&'a str>,
}

/// Chart encoder for producing payload JSON
pub struct ChartEncoder {
    instance_id: String,
}

impl Default for ChartEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode an aggregation into a chart payload
    pub fn encode(&self, aggregation: &Aggregation, context: &ChartContext<'_>) -> ChartPayload {
        let granularity = aggregation.series.granularity;
        let computed_at = Utc::now();

        let points = aggregation
            .series
            .iter()
            .map(|point| ChartPoint {
                label: point.label.clone(),
                value: point.value,
                period_start_utc: label_to_instant(
                    &point.label,
                    granularity,
                    &context.reference,
                    context.timezone,
                )
                .to_rfc3339(),
            })
            .collect();

        ChartPayload {
            schema_version: CHART_SCHEMA_VERSION.to_string(),
            producer: ChartProducer {
                name: PRODUCER_NAME.to_string(),
                version: TREND_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            granularity,
            chart_title: granularity.chart_title().to_string(),
            data_type: context.data_type.map(str::to_string),
            unit: context.unit.map(str::to_string),
            timezone: context.timezone,
            reference_utc: context.reference.to_rfc3339(),
            computed_at_utc: computed_at.to_rfc3339(),
            last_updated_label: last_updated_label(&context.reference, context.timezone),
            date_range_label: weekly_date_range_label(&context.reference, context.timezone),
            sample_count: context.sample_count,
            bucket_count: aggregation.buckets.len(),
            unplaced_labels: aggregation
                .unplaced
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            points,
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        aggregation: &Aggregation,
        context: &ChartContext<'_>,
    ) -> Result<String, ComputeError> {
        let payload = self.encode(aggregation, context);
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::SeriesAligner;
    use crate::types::{Granularity, Sample};
    use chrono::TimeZone;

    fn context(reference: DateTime<Utc>) -> ChartContext<'static> {
        ChartContext {
            reference,
            timezone: ChartTimezone::Utc,
            sample_count: 2,
            data_type: Some("walking_speed"),
            unit: Some("m/s"),
        }
    }

    #[test]
    fn test_encode_payload() {
        let reference = Utc.with_ymd_and_hms(2020, 6, 10, 12, 0, 0).unwrap();
        let samples = vec![
            Sample::instant(Utc.with_ymd_and_hms(2020, 6, 8, 9, 0, 0).unwrap(), 1.0),
            Sample::instant(Utc.with_ymd_and_hms(2020, 6, 8, 17, 0, 0).unwrap(), 2.0),
        ];
        let aggregation =
            SeriesAligner::new(ChartTimezone::Utc).aggregate(&samples, Granularity::Daily, &reference);

        let encoder = ChartEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder.encode(&aggregation, &context(reference));

        assert_eq!(payload.schema_version, CHART_SCHEMA_VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.chart_title, "Weekly");
        assert_eq!(payload.date_range_label, "Jun 3–10, 2020");
        assert_eq!(payload.last_updated_label, "last updated on Jun 10, 2020");
        assert_eq!(payload.bucket_count, 1);
        assert_eq!(payload.points.len(), 7);

        let monday = payload.points.iter().find(|p| p.label == "Mon").unwrap();
        assert_eq!(monday.value, 1.5);
        assert_eq!(monday.period_start_utc, "2020-06-08T00:00:00+00:00");
    }

    #[test]
    fn test_encode_to_json() {
        let reference = Utc.with_ymd_and_hms(2020, 6, 10, 12, 0, 0).unwrap();
        let aggregation = SeriesAligner::new(ChartTimezone::Utc).aggregate(&[], Granularity::Quarterly, &reference);

        let json = ChartEncoder::new()
            .encode_to_json(&aggregation, &context(reference))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["granularity"], "quarterly");
        assert_eq!(value["timezone"], "UTC");
        assert_eq!(value["unit"], "m/s");
        assert_eq!(value["points"].as_array().unwrap().len(), 4);
        assert_eq!(value["points"][3]["label"], "Apr-Jun");
    }
}
