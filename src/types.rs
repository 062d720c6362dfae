//! Core types for the Synheart Trend engine
//!
//! This module defines the data structures that flow through aggregation:
//! raw samples, granularity selection, the chart timezone, bucket keys, and
//! the fixed-cardinality axis series handed to a charting layer.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

/// A single timestamped measurement supplied by a sample source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the measurement period started (UTC)
    pub start_time: DateTime<Utc>,
    /// When the measurement period ended (UTC)
    pub end_time: DateTime<Utc>,
    /// Measured value in the batch unit
    pub value: f64,
}

impl Sample {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>, value: f64) -> Self {
        Self {
            start_time,
            end_time,
            value,
        }
    }

    /// A sample whose start and end coincide
    pub fn instant(at: DateTime<Utc>, value: f64) -> Self {
        Self::new(at, at, value)
    }
}

/// Calendar unit a chart is bucketed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Two-hour slots across one day
    Hourly,
    /// Weekdays across one week
    #[default]
    Daily,
    /// Months across one year
    Monthly,
    /// Quarters across one year
    Quarterly,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::Monthly,
        Granularity::Quarterly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
        }
    }

    /// Name of the chart this granularity renders, as shown in chart pickers.
    ///
    /// Hourly buckets make up a day-long chart and weekday buckets a
    /// week-long chart, so the titles describe the span rather than the unit.
    pub fn chart_title(&self) -> &'static str {
        match self {
            Granularity::Hourly => "Daily",
            Granularity::Daily => "Weekly",
            Granularity::Monthly => "Monthly",
            Granularity::Quarterly => "Quarterly",
        }
    }

    /// Ordered axis vocabulary for this granularity
    pub fn vocabulary(&self) -> &'static [&'static str] {
        crate::axis::vocabulary(*self)
    }

    /// Granularity of the year-long chart for the given orientation
    pub fn for_period_chart(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Landscape => Granularity::Monthly,
            Orientation::Portrait => Granularity::Quarterly,
        }
    }

    /// Map a chart picker segment to a granularity.
    ///
    /// Segments are day, week and year; the year segment resolves through
    /// [`Granularity::for_period_chart`].
    pub fn from_segment(index: usize, orientation: Orientation) -> Option<Self> {
        match index {
            0 => Some(Granularity::Hourly),
            1 => Some(Granularity::Daily),
            2 => Some(Self::for_period_chart(orientation)),
            _ => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Granularity::Hourly),
            "daily" => Ok(Granularity::Daily),
            "monthly" => Ok(Granularity::Monthly),
            "quarterly" => Ok(Granularity::Quarterly),
            other => Err(ComputeError::InvalidGranularity(other.to_string())),
        }
    }
}

/// Device orientation reported by the host at render time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Timezone used for every calendar derivation in a chart.
///
/// Defaults to the host's local timezone. Serialized as `"UTC"`, `"local"`
/// or a fixed offset such as `"+02:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChartTimezone {
    Utc,
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl ChartTimezone {
    /// Wall-clock time of `instant` in this timezone
    pub fn to_local(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            ChartTimezone::Utc => instant.naive_utc(),
            ChartTimezone::Local => instant.with_timezone(&Local).naive_local(),
            ChartTimezone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// Resolve a wall-clock time back to UTC.
    ///
    /// Returns `None` for local times skipped by a DST transition; ambiguous
    /// times resolve to the earlier instant.
    pub fn to_utc(&self, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            ChartTimezone::Utc => Some(Utc.from_utc_datetime(local)),
            ChartTimezone::Local => earliest_utc(&Local, local),
            ChartTimezone::Fixed(offset) => earliest_utc(offset, local),
        }
    }
}

fn earliest_utc<Tz: TimeZone>(tz: &Tz, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

impl fmt::Display for ChartTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartTimezone::Utc => f.write_str("UTC"),
            ChartTimezone::Local => f.write_str("local"),
            ChartTimezone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl FromStr for ChartTimezone {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "UTC" | "utc" | "Z" | "z" => return Ok(ChartTimezone::Utc),
            "local" | "Local" => return Ok(ChartTimezone::Local),
            _ => {}
        }

        trimmed
            .parse::<FixedOffset>()
            .map(ChartTimezone::Fixed)
            .map_err(|_| ComputeError::InvalidTimezone(trimmed.to_string()))
    }
}

impl TryFrom<String> for ChartTimezone {
    type Error = ComputeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChartTimezone> for String {
    fn from(tz: ChartTimezone) -> Self {
        tz.to_string()
    }
}

/// Label of the calendar period a sample falls into.
///
/// Keys depend only on the calendar-unit label, so the same month in two
/// different years yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketKey(String);

impl BucketKey {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sample after bucket classification
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedValue {
    /// Local start of the calendar period the sample falls in
    pub bucket_start: NaiveDateTime,
    /// Bucket the sample belongs to
    pub key: BucketKey,
    /// Sample value
    pub value: f64,
}

/// An observed, non-empty bucket after averaging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: BucketKey,
    /// Earliest local period start among the bucket's samples
    pub bucket_start: NaiveDateTime,
    /// Equal-weight mean of the bucket's sample values
    pub average: f64,
    pub sample_count: usize,
}

/// One position on the chart axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisPoint {
    pub label: String,
    pub value: f64,
}

/// Fixed-cardinality series aligned to a granularity's axis.
///
/// Always holds one point per vocabulary label, in rotated axis order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSeries {
    pub granularity: Granularity,
    pub points: Vec<AxisPoint>,
}

impl AxisSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value plotted at `label`, if the label is on the axis
    pub fn value_for(&self, label: &str) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisPoint> {
        self.points.iter()
    }
}

/// Chart payload producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A point of the encoded chart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    /// Start of the period the label denotes, relative to the reference instant
    pub period_start_utc: String,
}

/// Complete chart payload handed to a rendering layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPayload {
    pub schema_version: String,
    pub producer: ChartProducer,
    pub granularity: Granularity,
    pub chart_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub timezone: ChartTimezone,
    pub reference_utc: String,
    pub computed_at_utc: String,
    pub last_updated_label: String,
    pub date_range_label: String,
    pub sample_count: usize,
    pub bucket_count: usize,
    /// Observed bucket labels with no position on the axis
    #[serde(default)]
    pub unplaced_labels: Vec<String>,
    pub points: Vec<ChartPoint>,
}
