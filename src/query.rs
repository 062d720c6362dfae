//! Trailing query windows
//!
//! Each chart only looks back over the span its axis covers: one day for
//! hourly charts, one week for weekday charts and one year for monthly and
//! quarterly charts.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Granularity, Sample};

/// Closed time range samples must start in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    /// Window covering the span of a `granularity` chart ending at `end`
    pub fn trailing(granularity: Granularity, end: DateTime<Utc>) -> Self {
        let start = match granularity {
            Granularity::Hourly => end - Duration::days(1),
            Granularity::Daily => end - Duration::days(7),
            Granularity::Monthly | Granularity::Quarterly => end
                .checked_sub_months(Months::new(12))
                .unwrap_or(end - Duration::days(365)),
        };
        Self { start, end }
    }

    /// Whether the sample started inside the window
    pub fn contains(&self, sample: &Sample) -> bool {
        sample.start_time >= self.start && sample.start_time <= self.end
    }

    /// Samples that started inside the window
    pub fn filter(&self, samples: &[Sample]) -> Vec<Sample> {
        samples.iter().filter(|s| self.contains(s)).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_trailing_spans() {
        let end = at(2020, 6, 10, 12);

        assert_eq!(QueryWindow::trailing(Granularity::Hourly, end).start, at(2020, 6, 9, 12));
        assert_eq!(QueryWindow::trailing(Granularity::Daily, end).start, at(2020, 6, 3, 12));
        assert_eq!(QueryWindow::trailing(Granularity::Monthly, end).start, at(2019, 6, 10, 12));
        assert_eq!(QueryWindow::trailing(Granularity::Quarterly, end).start, at(2019, 6, 10, 12));
    }

    #[test]
    fn test_leap_day_window() {
        let end = at(2020, 2, 29, 12);
        assert_eq!(QueryWindow::trailing(Granularity::Monthly, end).start, at(2019, 2, 28, 12));
    }

    #[test]
    fn test_filter_keeps_bounds() {
        let window = QueryWindow::trailing(Granularity::Daily, at(2020, 6, 10, 12));
        let samples = vec![
            Sample::instant(at(2020, 6, 3, 12), 1.0),
            Sample::instant(at(2020, 6, 3, 11), 2.0),
            Sample::instant(at(2020, 6, 10, 12), 3.0),
            Sample::instant(at(2020, 6, 10, 13), 4.0),
        ];

        let kept: Vec<f64> = window.filter(&samples).iter().map(|s| s.value).collect();
        assert_eq!(kept, vec![1.0, 3.0]);
    }
}
