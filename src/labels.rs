//! Chart date labels
//!
//! Header and axis text derived from instants. Formatting is done per call
//! with chrono format strings; there is no shared formatter state.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::axis::{HOURS, MONTHS, QUARTERS, WEEKDAYS};
use crate::types::{ChartTimezone, Granularity};

/// Days covered by the weekly date range label
pub const WEEKLY_RANGE_DAYS: i64 = 7;

const MEDIUM_DATE: &str = "%b %-d, %Y";
const MONTH_DAY: &str = "%b %-d";
const DAY_YEAR: &str = "%-d, %Y";

/// Medium-style date, e.g. `"Jun 10, 2020"`
pub fn medium_date(instant: &DateTime<Utc>, timezone: ChartTimezone) -> String {
    timezone.to_local(instant).format(MEDIUM_DATE).to_string()
}

/// Header detail text, e.g. `"last updated on Jun 10, 2020"`
pub fn last_updated_label(instant: &DateTime<Utc>, timezone: ChartTimezone) -> String {
    format!("last updated on {}", medium_date(instant, timezone))
}

/// Label for the week ending at `end`, e.g. `"Jun 3–10, 2020"`.
///
/// The month is not repeated when both ends share it, and the start carries
/// its own year when the range crosses a year boundary.
pub fn weekly_date_range_label(end: &DateTime<Utc>, timezone: ChartTimezone) -> String {
    let end_local = timezone.to_local(end);
    let start_local = end_local - Duration::days(WEEKLY_RANGE_DAYS);

    let same_year = start_local.year() == end_local.year();
    let same_month = same_year && start_local.month() == end_local.month();

    let start_text = if same_year {
        start_local.format(MONTH_DAY).to_string()
    } else {
        start_local.format(MEDIUM_DATE).to_string()
    };

    let end_text = if same_month {
        end_local.format(DAY_YEAR).to_string()
    } else {
        end_local.format(MEDIUM_DATE).to_string()
    };

    format!("{start_text}–{end_text}")
}

/// `MM/dd` axis markers for explicit dates
pub fn axis_markers_for_dates(dates: &[DateTime<Utc>], timezone: ChartTimezone) -> Vec<String> {
    dates
        .iter()
        .map(|d| timezone.to_local(d).format("%m/%d").to_string())
        .collect()
}

/// Start of the most recent period named `label`, at or before `reference`.
///
/// Falls back to `reference` itself when the label is not part of the
/// granularity's vocabulary or the local time cannot be resolved.
pub fn label_to_instant(
    label: &str,
    granularity: Granularity,
    reference: &DateTime<Utc>,
    timezone: ChartTimezone,
) -> DateTime<Utc> {
    let local = timezone.to_local(reference);
    resolve_label(label, granularity, &local)
        .and_then(|start| timezone.to_utc(&start))
        .unwrap_or(*reference)
}

fn resolve_label(
    label: &str,
    granularity: Granularity,
    reference: &NaiveDateTime,
) -> Option<NaiveDateTime> {
    let date = reference.date();
    match granularity {
        Granularity::Hourly => {
            if !HOURS.contains(&label) {
                return None;
            }
            let hour: u32 = label.parse().ok()?;
            let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
            let start = date.and_time(time);
            if start > *reference {
                Some(start - Duration::days(1))
            } else {
                Some(start)
            }
        }
        Granularity::Daily => {
            let target = WEEKDAYS.iter().position(|d| *d == label)? as i64;
            let current = date.weekday().num_days_from_sunday() as i64;
            let days_back = (current - target).rem_euclid(7);
            Some((date - Duration::days(days_back)).and_time(NaiveTime::MIN))
        }
        Granularity::Monthly => {
            let month0 = MONTHS.iter().position(|m| *m == label)? as u32;
            period_start(date, month0)
        }
        Granularity::Quarterly => {
            let quarter = QUARTERS.iter().position(|q| *q == label)? as u32;
            period_start(date, quarter * 3)
        }
    }
}

/// First day of `month0` in the reference year, or the year before when that
/// month has not started yet
fn period_start(reference: NaiveDate, month0: u32) -> Option<NaiveDateTime> {
    let year = if month0 > reference.month0() {
        reference.year() - 1
    } else {
        reference.year()
    };
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).map(|d| d.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_last_updated_label() {
        assert_eq!(
            last_updated_label(&noon(2020, 6, 10), ChartTimezone::Utc),
            "last updated on Jun 10, 2020"
        );
    }

    #[test]
    fn test_weekly_range_same_month() {
        assert_eq!(
            weekly_date_range_label(&noon(2020, 6, 10), ChartTimezone::Utc),
            "Jun 3–10, 2020"
        );
    }

    #[test]
    fn test_weekly_range_across_months() {
        assert_eq!(
            weekly_date_range_label(&noon(2020, 6, 4), ChartTimezone::Utc),
            "May 28–Jun 4, 2020"
        );
    }

    #[test]
    fn test_weekly_range_across_years() {
        assert_eq!(
            weekly_date_range_label(&noon(2021, 1, 2), ChartTimezone::Utc),
            "Dec 26, 2020–Jan 2, 2021"
        );
    }

    #[test]
    fn test_axis_markers_for_dates() {
        let dates = vec![noon(2020, 6, 3), noon(2020, 12, 25)];
        assert_eq!(
            axis_markers_for_dates(&dates, ChartTimezone::Utc),
            vec!["06/03".to_string(), "12/25".to_string()]
        );
    }

    #[test]
    fn test_label_to_instant_weekday() {
        // Wednesday reference, Monday resolves two days earlier
        let reference = noon(2020, 6, 10);
        assert_eq!(
            label_to_instant("Mon", Granularity::Daily, &reference, ChartTimezone::Utc),
            Utc.with_ymd_and_hms(2020, 6, 8, 0, 0, 0).unwrap()
        );
        assert_eq!(
            label_to_instant("Thu", Granularity::Daily, &reference, ChartTimezone::Utc),
            Utc.with_ymd_and_hms(2020, 6, 4, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_label_to_instant_month_and_quarter() {
        let reference = noon(2021, 2, 15);
        assert_eq!(
            label_to_instant("Jan", Granularity::Monthly, &reference, ChartTimezone::Utc),
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            label_to_instant("Nov", Granularity::Monthly, &reference, ChartTimezone::Utc),
            Utc.with_ymd_and_hms(2020, 11, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            label_to_instant("Jul-Sep", Granularity::Quarterly, &reference, ChartTimezone::Utc),
            Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_label_to_instant_hour() {
        let reference = noon(2021, 2, 15);
        assert_eq!(
            label_to_instant("08", Granularity::Hourly, &reference, ChartTimezone::Utc),
            Utc.with_ymd_and_hms(2021, 2, 15, 8, 0, 0).unwrap()
        );
        assert_eq!(
            label_to_instant("20", Granularity::Hourly, &reference, ChartTimezone::Utc),
            Utc.with_ymd_and_hms(2021, 2, 14, 20, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unknown_label_falls_back_to_reference() {
        let reference = noon(2021, 2, 15);
        assert_eq!(
            label_to_instant("24", Granularity::Hourly, &reference, ChartTimezone::Utc),
            reference
        );
        assert_eq!(
            label_to_instant("Smarch", Granularity::Monthly, &reference, ChartTimezone::Utc),
            reference
        );
    }
}
