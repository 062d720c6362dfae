//! Axis vocabularies and canonical axis generation
//!
//! Each granularity has a fixed, ordered label vocabulary. A canonical axis is
//! that vocabulary rotated so the reference instant's own period is the last
//! label, wrapping circularly.

use chrono::{DateTime, Utc};

use crate::bucketer::local_label;
use crate::types::{ChartTimezone, Granularity};

/// Two-hour slots of a day
pub const HOURS: [&str; 12] = [
    "00", "02", "04", "06", "08", "10", "12", "14", "16", "18", "20", "22",
];

/// Weekday abbreviations, Sunday first
pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Month abbreviations
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Quarter labels
pub const QUARTERS: [&str; 4] = ["Jan-Mar", "Apr-Jun", "Jul-Sep", "Oct-Dec"];

/// Months belonging to each entry of [`QUARTERS`]
pub const QUARTER_MONTHS: [[&str; 3]; 4] = [
    ["Jan", "Feb", "Mar"],
    ["Apr", "May", "Jun"],
    ["Jul", "Aug", "Sep"],
    ["Oct", "Nov", "Dec"],
];

/// Ordered vocabulary for a granularity
pub fn vocabulary(granularity: Granularity) -> &'static [&'static str] {
    match granularity {
        Granularity::Hourly => &HOURS,
        Granularity::Daily => &WEEKDAYS,
        Granularity::Monthly => &MONTHS,
        Granularity::Quarterly => &QUARTERS,
    }
}

/// Canonical axis labels ending at the period containing `reference`.
///
/// When the reference period has no label on the axis (hour 23 buckets to
/// `"24"`), the vocabulary is returned in its natural order.
pub fn canonical_axis(
    granularity: Granularity,
    reference: &DateTime<Utc>,
    timezone: ChartTimezone,
) -> Vec<&'static str> {
    let anchor = local_label(&timezone.to_local(reference), granularity);
    rotate_to_anchor(vocabulary(granularity), &anchor)
}

/// Rotate `labels` so `anchor` is the last element
pub fn rotate_to_anchor(labels: &[&'static str], anchor: &str) -> Vec<&'static str> {
    match labels.iter().position(|label| *label == anchor) {
        Some(idx) => labels[idx + 1..]
            .iter()
            .chain(labels[..=idx].iter())
            .copied()
            .collect(),
        None => labels.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vocabulary_sizes() {
        assert_eq!(vocabulary(Granularity::Hourly).len(), 12);
        assert_eq!(vocabulary(Granularity::Daily).len(), 7);
        assert_eq!(vocabulary(Granularity::Monthly).len(), 12);
        assert_eq!(vocabulary(Granularity::Quarterly).len(), 4);
    }

    #[test]
    fn test_weekly_axis_ends_on_reference_weekday() {
        // Wednesday
        let reference = Utc.with_ymd_and_hms(2020, 6, 10, 9, 0, 0).unwrap();
        let axis = canonical_axis(Granularity::Daily, &reference, ChartTimezone::Utc);

        assert_eq!(axis, vec!["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"]);
    }

    #[test]
    fn test_saturday_reference_keeps_natural_order() {
        let reference = Utc.with_ymd_and_hms(2020, 6, 13, 9, 0, 0).unwrap();
        let axis = canonical_axis(Granularity::Daily, &reference, ChartTimezone::Utc);

        assert_eq!(axis, WEEKDAYS.to_vec());
    }

    #[test]
    fn test_monthly_axis_wraps_year() {
        let reference = Utc.with_ymd_and_hms(2021, 2, 3, 9, 0, 0).unwrap();
        let axis = canonical_axis(Granularity::Monthly, &reference, ChartTimezone::Utc);

        assert_eq!(axis.first(), Some(&"Mar"));
        assert_eq!(axis.last(), Some(&"Feb"));
        assert_eq!(axis.len(), 12);
    }

    #[test]
    fn test_quarterly_axis() {
        let reference = Utc.with_ymd_and_hms(2021, 5, 3, 9, 0, 0).unwrap();
        let axis = canonical_axis(Granularity::Quarterly, &reference, ChartTimezone::Utc);

        assert_eq!(axis, vec!["Jul-Sep", "Oct-Dec", "Jan-Mar", "Apr-Jun"]);
    }

    #[test]
    fn test_hourly_axis_anchor() {
        let reference = Utc.with_ymd_and_hms(2021, 5, 3, 7, 30, 0).unwrap();
        let axis = canonical_axis(Granularity::Hourly, &reference, ChartTimezone::Utc);

        assert_eq!(axis.last(), Some(&"08"));
        assert_eq!(axis.first(), Some(&"10"));
    }

    #[test]
    fn test_hour_23_reference_falls_back_to_natural_order() {
        let reference = Utc.with_ymd_and_hms(2021, 5, 3, 23, 30, 0).unwrap();
        let axis = canonical_axis(Granularity::Hourly, &reference, ChartTimezone::Utc);

        assert_eq!(axis, HOURS.to_vec());
    }
}
