//! Time bucketing
//!
//! Classifies sample timestamps into calendar buckets for a granularity.
//! All derivation happens on the wall-clock time in the chart timezone.
//!
//! Hourly buckets pair an odd hour with the following even hour, so 01:xx
//! lands in `"02"`. Hour 23 therefore produces `"24"`, a label that is not on
//! the hourly axis; the aligner reports such buckets as unplaced.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::axis::{MONTHS, QUARTERS, QUARTER_MONTHS, WEEKDAYS};
use crate::types::{BucketKey, BucketedValue, ChartTimezone, Granularity, Sample};

/// Classifies instants into bucket keys for a fixed chart timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeBucketer {
    timezone: ChartTimezone,
}

impl TimeBucketer {
    pub fn new(timezone: ChartTimezone) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> ChartTimezone {
        self.timezone
    }

    /// Bucket key of `instant` at `granularity`
    pub fn bucket_key(&self, instant: &DateTime<Utc>, granularity: Granularity) -> BucketKey {
        BucketKey::new(local_label(&self.timezone.to_local(instant), granularity))
    }

    /// Local wall-clock start of the calendar period containing `instant`.
    ///
    /// Quarterly buckets truncate to the month, which is enough to order
    /// them.
    pub fn bucket_start(&self, instant: &DateTime<Utc>, granularity: Granularity) -> NaiveDateTime {
        truncate(&self.timezone.to_local(instant), granularity)
    }

    /// Classify a sample by its start time
    pub fn classify(&self, sample: &Sample, granularity: Granularity) -> BucketedValue {
        let local = self.timezone.to_local(&sample.start_time);
        BucketedValue {
            bucket_start: truncate(&local, granularity),
            key: BucketKey::new(local_label(&local, granularity)),
            value: sample.value,
        }
    }
}

/// Axis label for a local wall-clock time
pub(crate) fn local_label(local: &NaiveDateTime, granularity: Granularity) -> String {
    match granularity {
        Granularity::Hourly => hour_label(local.hour()),
        Granularity::Daily => weekday_label(local.date()).to_string(),
        Granularity::Monthly => month_label(local.date()).to_string(),
        Granularity::Quarterly => {
            let month = month_label(local.date());
            quarter_label(month)
                .unwrap_or(QUARTERS[local.month0() as usize / 3])
                .to_string()
        }
    }
}

/// Two-digit label for an hour, rounding odd hours up to the next even one
pub fn hour_label(hour: u32) -> String {
    let rounded = if hour % 2 == 0 { hour } else { hour + 1 };
    format!("{rounded:02}")
}

/// Three-letter weekday abbreviation
pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_sunday() as usize]
}

/// Three-letter month abbreviation
pub fn month_label(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// Quarter containing a three-letter month abbreviation
pub fn quarter_label(month: &str) -> Option<&'static str> {
    QUARTER_MONTHS
        .iter()
        .position(|months| months.contains(&month))
        .map(|idx| QUARTERS[idx])
}

fn truncate(local: &NaiveDateTime, granularity: Granularity) -> NaiveDateTime {
    let date = local.date();
    match granularity {
        Granularity::Hourly => {
            let time = NaiveTime::from_hms_opt(local.hour(), 0, 0).unwrap_or(NaiveTime::MIN);
            date.and_time(time)
        }
        Granularity::Daily => date.and_time(NaiveTime::MIN),
        Granularity::Monthly | Granularity::Quarterly => date
            .with_day(1)
            .unwrap_or(date)
            .and_time(NaiveTime::MIN),
    }
}
