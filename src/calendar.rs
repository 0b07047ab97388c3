use chrono::format::ParseErrorKind;
use chrono::{NaiveDate, TimeDelta};
use std::fmt;
use thiserror::Error;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDateKind {
    Empty,
    Malformed,
    OutOfRange,
}

impl fmt::Display for InvalidDateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidDateKind::Empty => write!(f, "date is empty"),
            InvalidDateKind::Malformed => write!(f, "expected YYYY-MM-DD"),
            InvalidDateKind::OutOfRange => write!(f, "date component out of range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date '{value}': {kind}")]
pub struct InvalidDateError {
    pub value: String,
    pub kind: InvalidDateKind,
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, InvalidDateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InvalidDateError {
            value: value.to_string(),
            kind: InvalidDateKind::Empty,
        });
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT).map_err(|err| {
        let kind = match err.kind() {
            ParseErrorKind::OutOfRange | ParseErrorKind::Impossible => InvalidDateKind::OutOfRange,
            _ => InvalidDateKind::Malformed,
        };
        InvalidDateError {
            value: value.to_string(),
            kind,
        }
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// `date` shifted by `days`, or `None` past chrono's representable range.
pub fn checked_add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// `date` shifted by `days`, saturating at `NaiveDate::MIN` / `NaiveDate::MAX`.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    checked_add_days(date, days).unwrap_or(if days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Inclusive day count of a start/end pair.
pub fn duration_between(start: NaiveDate, end: NaiveDate) -> i64 {
    days_between(start, end).saturating_add(1)
}

/// End date of a task starting on `start` that lasts `duration_days`.
pub fn end_date_for(start: NaiveDate, duration_days: i64) -> NaiveDate {
    add_days(start, duration_days.max(1) - 1)
}

/// Start date of a task ending on `end` that lasts `duration_days`.
pub fn start_date_for(end: NaiveDate, duration_days: i64) -> NaiveDate {
    add_days(end, -(duration_days.max(1) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_date_accepts_iso_and_classifies_failures() {
        assert_eq!(parse_date("2024-02-29").unwrap(), d(2024, 2, 29));
        assert_eq!(parse_date(" 2024-01-01 ").unwrap(), d(2024, 1, 1));
        assert_eq!(parse_date("").unwrap_err().kind, InvalidDateKind::Empty);
        assert_eq!(
            parse_date("01/02/2024").unwrap_err().kind,
            InvalidDateKind::Malformed
        );
        assert_eq!(
            parse_date("2023-02-30").unwrap_err().kind,
            InvalidDateKind::OutOfRange
        );
    }

    #[test]
    fn inclusive_duration_round_trips_through_end_date() {
        let start = d(2024, 1, 30);
        let end = end_date_for(start, 3);
        assert_eq!(end, d(2024, 2, 1));
        assert_eq!(duration_between(start, end), 3);
        assert_eq!(start_date_for(end, 3), start);
        assert_eq!(end_date_for(start, 0), start);
    }

    #[test]
    fn day_arithmetic_saturates_instead_of_panicking() {
        let start = d(2024, 1, 1);
        assert_eq!(checked_add_days(start, 200_000_000), None);
        assert_eq!(add_days(start, 200_000_000), NaiveDate::MAX);
        assert_eq!(add_days(start, i64::MIN), NaiveDate::MIN);
        assert_eq!(end_date_for(start, i64::MAX), NaiveDate::MAX);
        assert_eq!(start_date_for(start, i64::MAX), NaiveDate::MIN);
        assert_eq!(add_days(start, -1), d(2023, 12, 31));
    }
}
