//! Upload-date windows.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Window length used when the caller does not pick one.
pub const DEFAULT_DAYS_OFFSET: u32 = 7;

/// A closed time range. `end` is one second before the next window's
/// `start`, so consecutive windows never share a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Splits `days_total` days starting at midnight UTC on `start` into
/// windows of `days_offset` days.
///
/// Produces `days_total / days_offset` windows (remainder days are not
/// covered). Planning stops before the first window that would start at or
/// after `now`, or whose end is past the last representable date.
#[must_use]
pub fn plan_windows(
    start: NaiveDate,
    days_total: u32,
    days_offset: u32,
    now: DateTime<Utc>,
) -> Vec<TimeWindow> {
    if days_offset == 0 {
        log::warn!("Window length of zero days, nothing to plan");
        return Vec::new();
    }

    let Some(step) = Duration::try_days(i64::from(days_offset)) else {
        log::warn!("Window length of {days_offset} days is out of range");
        return Vec::new();
    };
    let count = days_total / days_offset;
    let mut window_start = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let mut windows = Vec::new();

    for _ in 0..count {
        if window_start >= now {
            log::warn!("Window starting {window_start} is in the future, stopping");
            break;
        }

        let Some(next) = window_start.checked_add_signed(step) else {
            log::warn!("Window starting {window_start} runs past the calendar, stopping");
            break;
        };
        windows.push(TimeWindow {
            start: window_start,
            end: next - Duration::seconds(1),
        });
        window_start = next;
    }

    log::debug!("Planned {} windows from {start}", windows.len());
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn far_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn fourteen_days_by_seven_gives_two_windows() {
        let windows = plan_windows(date(2009, 3, 1), 14, 7, far_future());

        assert_eq!(windows.len(), 2);
        assert_eq!(
            windows[0].start,
            Utc.with_ymd_and_hms(2009, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            windows[0].end,
            Utc.with_ymd_and_hms(2009, 3, 7, 23, 59, 59).unwrap()
        );
        assert_eq!(
            windows[1].start,
            Utc.with_ymd_and_hms(2009, 3, 8, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn windows_are_contiguous() {
        let windows = plan_windows(date(2010, 12, 20), 60, 5, far_future());

        assert_eq!(windows.len(), 12);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end + Duration::seconds(1), pair[1].start);
            assert!(pair[0].start < pair[0].end);
        }
    }

    #[test]
    fn remainder_days_are_dropped() {
        assert_eq!(plan_windows(date(2009, 1, 1), 20, 7, far_future()).len(), 2);
        assert!(plan_windows(date(2009, 1, 1), 6, 7, far_future()).is_empty());
    }

    #[test]
    fn future_window_aborts_planning() {
        let now = Utc.with_ymd_and_hms(2009, 1, 10, 12, 0, 0).unwrap();
        let windows = plan_windows(date(2009, 1, 1), 28, 7, now);

        assert_eq!(windows.len(), 2);
        assert!(windows[1].start < now);
    }

    #[test]
    fn start_in_the_future_gives_nothing() {
        let now = Utc.with_ymd_and_hms(2009, 1, 1, 0, 0, 0).unwrap();
        assert!(plan_windows(date(2009, 1, 1), 14, 7, now).is_empty());
    }

    #[test]
    fn zero_offset_gives_nothing() {
        assert!(plan_windows(date(2009, 1, 1), 14, 0, far_future()).is_empty());
    }

    #[test]
    fn window_past_the_calendar_stops_planning() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(plan_windows(date(2009, 1, 1), u32::MAX, u32::MAX, now).is_empty());
    }

    #[test]
    fn huge_day_count_is_bounded_by_now() {
        let now = Utc.with_ymd_and_hms(2009, 1, 10, 12, 0, 0).unwrap();
        let windows = plan_windows(date(2009, 1, 1), u32::MAX, 1, now);

        assert_eq!(windows.len(), 10);
        assert_eq!(
            windows[9].start,
            Utc.with_ymd_and_hms(2009, 1, 10, 0, 0, 0).unwrap()
        );
    }
}
