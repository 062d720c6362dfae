//! Series alignment
//!
//! Groups samples into buckets, averages each bucket, and aligns the result
//! onto the canonical axis for the granularity. Labels without samples are
//! filled with `0.0` so the series always has one point per axis label.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::axis::canonical_axis;
use crate::bucketer::TimeBucketer;
use crate::types::{AxisPoint, AxisSeries, Bucket, BucketKey, ChartTimezone, Granularity, Sample};

/// Result of a full aggregation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Aligned series, one point per axis label
    pub series: AxisSeries,
    /// Observed buckets sorted by period start
    pub buckets: Vec<Bucket>,
    /// Observed labels that have no position on the axis
    pub unplaced: Vec<BucketKey>,
    /// Samples skipped for carrying a non-finite value
    pub skipped_samples: usize,
}

/// Aligns sample batches onto chart axes.
///
/// Holds only the chart timezone; every call starts from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesAligner {
    bucketer: TimeBucketer,
}

impl SeriesAligner {
    pub fn new(timezone: ChartTimezone) -> Self {
        Self {
            bucketer: TimeBucketer::new(timezone),
        }
    }

    pub fn timezone(&self) -> ChartTimezone {
        self.bucketer.timezone()
    }

    /// Align `samples` onto the axis for `granularity` ending at `reference`
    pub fn align(
        &self,
        samples: &[Sample],
        granularity: Granularity,
        reference: &DateTime<Utc>,
    ) -> AxisSeries {
        self.aggregate(samples, granularity, reference).series
    }

    /// Align and report the intermediate buckets
    pub fn aggregate(
        &self,
        samples: &[Sample],
        granularity: Granularity,
        reference: &DateTime<Utc>,
    ) -> Aggregation {
        let (buckets, skipped_samples) = self.average_buckets(samples, granularity);

        let axis = canonical_axis(granularity, reference, self.bucketer.timezone());
        let observed: HashMap<&str, f64> = buckets
            .iter()
            .map(|b| (b.key.as_str(), b.average))
            .collect();

        let mut points: Vec<AxisPoint> = Vec::with_capacity(axis.len());
        for (position, label) in axis.iter().enumerate() {
            match observed.get(label) {
                Some(average) => points.push(AxisPoint {
                    label: label.to_string(),
                    value: *average,
                }),
                None => points.insert(
                    position,
                    AxisPoint {
                        label: label.to_string(),
                        value: 0.0,
                    },
                ),
            }
        }

        let unplaced: Vec<BucketKey> = buckets
            .iter()
            .filter(|b| !axis.contains(&b.key.as_str()))
            .map(|b| b.key.clone())
            .collect();

        if !unplaced.is_empty() {
            tracing::warn!(
                granularity = %granularity,
                labels = ?unplaced,
                "observed buckets have no position on the axis"
            );
        }

        tracing::debug!(
            granularity = %granularity,
            samples = samples.len(),
            buckets = buckets.len(),
            filled = axis.len() - (buckets.len() - unplaced.len()),
            "aligned series"
        );

        Aggregation {
            series: AxisSeries {
                granularity,
                points,
            },
            buckets,
            unplaced,
            skipped_samples,
        }
    }

    /// Observed labels in period order
    pub fn observed_labels(&self, samples: &[Sample], granularity: Granularity) -> Vec<BucketKey> {
        self.average_buckets(samples, granularity)
            .0
            .into_iter()
            .map(|b| b.key)
            .collect()
    }

    /// Average non-empty buckets, sorted ascending by period start
    fn average_buckets(&self, samples: &[Sample], granularity: Granularity) -> (Vec<Bucket>, usize) {
        let mut accumulators: HashMap<BucketKey, BucketAccumulator> = HashMap::new();
        let mut skipped = 0;

        for sample in samples {
            if !sample.value.is_finite() {
                skipped += 1;
                continue;
            }

            let bucketed = self.bucketer.classify(sample, granularity);
            accumulators
                .entry(bucketed.key)
                .and_modify(|acc| acc.add(bucketed.bucket_start, bucketed.value))
                .or_insert_with(|| BucketAccumulator::new(bucketed.bucket_start, bucketed.value));
        }

        if skipped > 0 {
            tracing::warn!(skipped, "skipped samples with non-finite values");
        }

        let mut buckets: Vec<Bucket> = accumulators
            .into_iter()
            .map(|(key, acc)| Bucket {
                key,
                bucket_start: acc.bucket_start,
                average: acc.sum / acc.count as f64,
                sample_count: acc.count,
            })
            .collect();

        buckets.sort_by(|a, b| {
            a.bucket_start
                .cmp(&b.bucket_start)
                .then_with(|| a.key.cmp(&b.key))
        });

        (buckets, skipped)
    }
}

struct BucketAccumulator {
    bucket_start: chrono::NaiveDateTime,
    sum: f64,
    count: usize,
}

impl BucketAccumulator {
    fn new(bucket_start: chrono::NaiveDateTime, value: f64) -> Self {
        Self {
            bucket_start,
            sum: value,
            count: 1,
        }
    }

    fn add(&mut self, bucket_start: chrono::NaiveDateTime, value: f64) {
        self.bucket_start = self.bucket_start.min(bucket_start);
        self.sum += value;
        self.count += 1;
    }
}
