use crate::calendar::{self, add_days};
use crate::error::ScheduleError;
use crate::task::{DateRange, DependencyType};
use chrono::NaiveDate;

/// Dates a successor must take to satisfy one dependency exactly.
///
/// | type | rule |
/// |------|------|
/// | FS | successor start = predecessor end + lag + 1 |
/// | SS | successor start = predecessor start + lag |
/// | FF | successor end = predecessor end + lag |
/// | SF | successor end = predecessor start + lag |
///
/// The other end of the successor is derived from `successor_duration`
/// (clamped to at least one day).
pub fn calculate_successor_dates(
    predecessor_start: NaiveDate,
    predecessor_end: NaiveDate,
    successor_duration: i64,
    dependency_type: DependencyType,
    lag_days: i64,
) -> DateRange {
    match dependency_type {
        DependencyType::FinishToStart => {
            let start = add_days(predecessor_end, lag_days.saturating_add(1));
            DateRange::new(start, calendar::end_date_for(start, successor_duration))
        }
        DependencyType::StartToStart => {
            let start = add_days(predecessor_start, lag_days);
            DateRange::new(start, calendar::end_date_for(start, successor_duration))
        }
        DependencyType::FinishToFinish => {
            let end = add_days(predecessor_end, lag_days);
            DateRange::new(calendar::start_date_for(end, successor_duration), end)
        }
        DependencyType::StartToFinish => {
            let end = add_days(predecessor_start, lag_days);
            DateRange::new(calendar::start_date_for(end, successor_duration), end)
        }
    }
}

/// Same as [`calculate_successor_dates`] for ISO `YYYY-MM-DD` inputs.
pub fn calculate_successor_dates_str(
    predecessor_start: &str,
    predecessor_end: &str,
    successor_duration: i64,
    dependency_type: &str,
    lag_days: i64,
) -> Result<DateRange, ScheduleError> {
    let start = calendar::parse_date(predecessor_start)?;
    let end = calendar::parse_date(predecessor_end)?;
    let dependency_type = dependency_type.parse::<DependencyType>()?;
    Ok(calculate_successor_dates(
        start,
        end,
        successor_duration,
        dependency_type,
        lag_days,
    ))
}

/// Earliest start offset a dependency allows, in days from the project start.
pub(crate) fn constrained_early_start(
    dependency_type: DependencyType,
    lag_days: i64,
    predecessor_early_start: i64,
    predecessor_early_finish: i64,
    successor_duration: i64,
) -> i64 {
    match dependency_type {
        DependencyType::FinishToStart => predecessor_early_finish
            .saturating_add(lag_days)
            .saturating_add(1),
        DependencyType::StartToStart => predecessor_early_start.saturating_add(lag_days),
        DependencyType::FinishToFinish => predecessor_early_finish
            .saturating_add(lag_days)
            .saturating_sub(successor_duration - 1),
        DependencyType::StartToFinish => predecessor_early_start
            .saturating_add(lag_days)
            .saturating_sub(successor_duration - 1),
    }
}

/// Latest finish offset a dependency allows its predecessor.
pub(crate) fn constrained_late_finish(
    dependency_type: DependencyType,
    lag_days: i64,
    successor_late_start: i64,
    successor_late_finish: i64,
    predecessor_duration: i64,
) -> i64 {
    match dependency_type {
        DependencyType::FinishToStart => successor_late_start
            .saturating_sub(lag_days)
            .saturating_sub(1),
        DependencyType::StartToStart => successor_late_start
            .saturating_sub(lag_days)
            .saturating_add(predecessor_duration - 1),
        DependencyType::FinishToFinish => successor_late_finish.saturating_sub(lag_days),
        DependencyType::StartToFinish => successor_late_finish
            .saturating_sub(lag_days)
            .saturating_add(predecessor_duration - 1),
    }
}
