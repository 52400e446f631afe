//! Weekday aggregation of presence entries.

use chrono::{Datelike, NaiveTime, Timelike};

use crate::data::UserPresence;

/// Abbreviated weekday names, Monday first.
pub const WEEKDAY_ABBR: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Start and end times of one weekday, as seconds since midnight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartEnd {
    pub start: Vec<i64>,
    pub end: Vec<i64>,
}

/// Seconds elapsed since midnight, ignoring fractions.
pub fn seconds_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight())
}

/// Seconds between `start` and `end`; negative when `end` is earlier.
pub fn interval(start: NaiveTime, end: NaiveTime) -> i64 {
    seconds_since_midnight(end) - seconds_since_midnight(start)
}

/// Arithmetic mean, zero for an empty slice.
pub fn mean(items: &[i64]) -> f64 {
    if items.is_empty() {
        0.0
    } else {
        items.iter().sum::<i64>() as f64 / items.len() as f64
    }
}

/// Groups presence intervals by weekday, Monday first.
pub fn group_by_weekday(items: &UserPresence) -> [Vec<i64>; 7] {
    let mut result: [Vec<i64>; 7] = Default::default();
    for (date, entry) in items {
        result[weekday_index(date)].push(interval(entry.start, entry.end));
    }
    result
}

/// Groups start and end times by weekday, Monday first.
pub fn group_start_end_by_weekday(items: &UserPresence) -> [StartEnd; 7] {
    let mut result: [StartEnd; 7] = Default::default();
    for (date, entry) in items {
        let day = &mut result[weekday_index(date)];
        day.start.push(seconds_since_midnight(entry.start));
        day.end.push(seconds_since_midnight(entry.end));
    }
    result
}

/// Mean start and end per weekday, as `(day, mean_start, mean_end)`.
pub fn average_start_end(items: &[StartEnd; 7]) -> Vec<(&'static str, f64, f64)> {
    items
        .iter()
        .zip(WEEKDAY_ABBR)
        .map(|(day, name)| (name, mean(&day.start), mean(&day.end)))
        .collect()
}

fn weekday_index(date: &impl Datelike) -> usize {
    date.weekday().num_days_from_monday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PresenceEntry;
    use chrono::NaiveDate;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn sample() -> UserPresence {
        let mut items = UserPresence::new();
        // 2013-09-10 and 2013-09-17 are Tuesdays, 2013-09-11 a Wednesday
        items.insert(
            NaiveDate::from_ymd_opt(2013, 9, 10).unwrap(),
            PresenceEntry { start: time(9, 39, 5), end: time(17, 59, 52) },
        );
        items.insert(
            NaiveDate::from_ymd_opt(2013, 9, 17).unwrap(),
            PresenceEntry { start: time(9, 0, 0), end: time(17, 0, 0) },
        );
        items.insert(
            NaiveDate::from_ymd_opt(2013, 9, 11).unwrap(),
            PresenceEntry { start: time(9, 19, 52), end: time(16, 7, 37) },
        );
        items
    }

    #[test]
    fn test_seconds_since_midnight() {
        assert_eq!(seconds_since_midnight(time(0, 0, 0)), 0);
        assert_eq!(seconds_since_midnight(time(0, 0, 59)), 59);
        assert_eq!(seconds_since_midnight(time(1, 1, 1)), 3661);
        assert_eq!(seconds_since_midnight(time(23, 59, 59)), 86_399);
    }

    #[test]
    fn test_interval() {
        assert_eq!(interval(time(9, 39, 5), time(17, 59, 52)), 30_047);
        assert_eq!(interval(time(8, 0, 0), time(8, 0, 0)), 0);
        assert_eq!(interval(time(12, 0, 0), time(11, 0, 0)), -3_600);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[10]), 10.0);
        assert_eq!(mean(&[1, 2]), 1.5);
        assert_eq!(mean(&[-4, 4, 3]), 1.0);
    }

    #[test]
    fn test_group_by_weekday() {
        let grouped = group_by_weekday(&sample());

        assert!(grouped[0].is_empty());
        assert_eq!(grouped[1], vec![30_047, 28_800]);
        assert_eq!(grouped[2], vec![24_465]);
        assert!(grouped[3..].iter().all(Vec::is_empty));
    }

    #[test]
    fn test_group_start_end_by_weekday() {
        let grouped = group_start_end_by_weekday(&sample());

        assert_eq!(grouped[1].start, vec![34_745, 32_400]);
        assert_eq!(grouped[1].end, vec![64_792, 61_200]);
        assert_eq!(grouped[2].start, vec![33_592]);
        assert_eq!(grouped[6], StartEnd::default());
    }

    #[test]
    fn test_average_start_end() {
        let averages = average_start_end(&group_start_end_by_weekday(&sample()));

        assert_eq!(averages.len(), 7);
        assert_eq!(averages[0], ("Mon", 0.0, 0.0));
        assert_eq!(averages[1], ("Tue", 33_572.5, 62_996.0));
        assert_eq!(averages[2], ("Wed", 33_592.0, 58_057.0));
        assert_eq!(averages[6].0, "Sun");
    }
}
