use crate::errors::{Error, Result};
use crate::models::Holiday;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

const KEY_FORMAT: &str = "%Y-%m-%d";

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Canonical `YYYY-MM-DD` storage key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

pub fn parse_date_key(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::bad_request("date is required"));
    }
    // chrono accepts unpadded fields; keys must be canonical.
    NaiveDate::parse_from_str(trimmed, KEY_FORMAT)
        .ok()
        .filter(|date| date_key(*date) == trimmed)
        .ok_or_else(|| Error::bad_request(format!("invalid date '{trimmed}', expected YYYY-MM-DD")))
}

/// Both ends required, well-formed, and ordered.
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let (Some(start), Some(end)) = (non_empty(start), non_empty(end)) else {
        return Err(Error::bad_request("startDate and endDate are required"));
    };
    let start_date = parse_date_key(start)?;
    let end_date = parse_date_key(end)?;
    if start_date > end_date {
        return Err(Error::invalid_range(start, end));
    }
    Ok((start_date, end_date))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn weekday_name(day: u8) -> Option<&'static str> {
    WEEKDAY_NAMES.get(day as usize).copied()
}

/// `"Monday, 03 Jun 2024"`.
pub fn display_day_date(date: NaiveDate) -> String {
    date.format("%A, %d %b %Y").to_string()
}

/// Working-day rules: Sundays and declared holidays are off.
#[derive(Debug, Clone, Default)]
pub struct Calendar {
    holidays: BTreeSet<NaiveDate>,
}

impl Calendar {
    pub fn new(holidays: &[Holiday]) -> Self {
        Self {
            holidays: holidays.iter().map(|holiday| holiday.date).collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_non_working_day(&self, date: NaiveDate) -> bool {
        date.weekday() == Weekday::Sun || self.is_holiday(date)
    }

    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> Result<u32> {
        if start > end {
            return Err(Error::invalid_range(&date_key(start), &date_key(end)));
        }

        let count = start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| !self.is_non_working_day(*date))
            .count();
        Ok(count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_counts_zero_only_on_sunday() {
        let calendar = Calendar::default();
        let start = day(2024, 6, 1);
        for offset in 0..14 {
            let date = start + Duration::days(offset);
            let expected = if date.weekday() == Weekday::Sun { 0 } else { 1 };
            assert_eq!(calendar.count_working_days(date, date).unwrap(), expected, "{date}");
        }
    }

    #[test]
    fn june_2024_has_25_working_days() {
        let calendar = Calendar::default();
        let count = calendar
            .count_working_days(day(2024, 6, 1), day(2024, 6, 30))
            .unwrap();
        assert_eq!(count, 25);
    }

    #[test]
    fn declared_holiday_is_not_a_working_day() {
        let calendar = Calendar::new(&[Holiday {
            date: day(2024, 6, 17),
            name: "Bakri Id".into(),
            description: String::new(),
        }]);
        assert!(calendar.is_non_working_day(day(2024, 6, 17)));
        let count = calendar
            .count_working_days(day(2024, 6, 1), day(2024, 6, 30))
            .unwrap();
        assert_eq!(count, 24);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let calendar = Calendar::default();
        let err = calendar
            .count_working_days(day(2024, 6, 2), day(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn date_keys_must_be_canonical() {
        assert_eq!(parse_date_key("2024-06-03").unwrap(), day(2024, 6, 3));
        assert!(parse_date_key("2024-6-3").is_err());
        assert!(parse_date_key("2024-02-30").is_err());
        assert!(parse_date_key("03/06/2024").is_err());
        assert!(parse_date_key("").is_err());
    }

    #[test]
    fn parse_range_requires_both_ends_in_order() {
        assert!(parse_range(Some("2024-06-01"), None).is_err());
        assert!(parse_range(Some(""), Some("2024-06-01")).is_err());
        assert!(parse_range(Some("2024-06-02"), Some("2024-06-01")).is_err());
        let (start, end) = parse_range(Some("2024-06-01"), Some("2024-06-01")).unwrap();
        assert_eq!(start, end);
    }

    #[test]
    fn weekday_helpers() {
        assert_eq!(weekday_number(day(2024, 6, 2)), 0);
        assert_eq!(weekday_number(day(2024, 6, 8)), 6);
        assert_eq!(weekday_name(1), Some("Monday"));
        assert_eq!(weekday_name(7), None);
        assert_eq!(display_day_date(day(2024, 6, 3)), "Monday, 03 Jun 2024");
    }
}
