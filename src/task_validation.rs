use crate::calendar;
use crate::task::{Task, TaskId};
use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Longest task the engine accepts: one hundred years of calendar days.
pub const MAX_DURATION_DAYS: i64 = 36_525;

/// Largest lag, in either direction, a dependency may carry.
pub const MAX_LAG_DAYS: i64 = 36_525;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("task has an empty id")]
    EmptyId,

    #[error("duplicate task id {0}")]
    DuplicateId(TaskId),

    #[error("task {task_id} has non-positive duration {duration_days}")]
    NonPositiveDuration { task_id: TaskId, duration_days: i64 },

    #[error("task {task_id} duration {duration_days} exceeds {max} days", max = MAX_DURATION_DAYS)]
    DurationOutOfRange { task_id: TaskId, duration_days: i64 },

    #[error(
        "task {task_id} lag {lag_days} after {predecessor_id} is outside +/-{max} days",
        max = MAX_LAG_DAYS
    )]
    LagOutOfRange {
        task_id: TaskId,
        predecessor_id: TaskId,
        lag_days: i64,
    },

    #[error("task {task_id} starts on {start} after it ends on {end}")]
    StartAfterEnd {
        task_id: TaskId,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Reject durations and lags too large for day arithmetic to stay meaningful.
///
/// Applied to every record crossing the snapshot boundary, whether or not
/// full validation is enabled.
pub fn validate_ranges(task: &Task) -> Result<(), TaskValidationError> {
    if task.duration_days > MAX_DURATION_DAYS {
        return Err(TaskValidationError::DurationOutOfRange {
            task_id: task.id.clone(),
            duration_days: task.duration_days,
        });
    }

    if let Some(dependency) = task
        .dependencies
        .iter()
        .find(|dep| !(-MAX_LAG_DAYS..=MAX_LAG_DAYS).contains(&dep.lag_days))
    {
        return Err(TaskValidationError::LagOutOfRange {
            task_id: task.id.clone(),
            predecessor_id: dependency.predecessor_id.clone(),
            lag_days: dependency.lag_days,
        });
    }

    Ok(())
}

pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.id.trim().is_empty() {
        return Err(TaskValidationError::EmptyId);
    }

    if task.duration_days < 1 {
        return Err(TaskValidationError::NonPositiveDuration {
            task_id: task.id.clone(),
            duration_days: task.duration_days,
        });
    }

    if task.start_date > task.end_date {
        return Err(TaskValidationError::StartAfterEnd {
            task_id: task.id.clone(),
            start: task.start_date,
            end: task.end_date,
        });
    }

    validate_ranges(task)?;

    // Callers own the duration/date-pair consistency; only report it.
    let span = calendar::duration_between(task.start_date, task.end_date);
    if span != task.duration_days {
        debug!(
            task_id = %task.id,
            duration_days = task.duration_days,
            span,
            "task duration disagrees with its date range"
        );
    }

    Ok(())
}

pub fn validate_tasks(tasks: &[Task]) -> Result<(), TaskValidationError> {
    validate_all(tasks)
}

/// [`validate_tasks`] over any borrowed sequence of tasks.
pub fn validate_all<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::new();
    for task in tasks {
        if !seen_ids.insert(task.id.as_str()) {
            return Err(TaskValidationError::DuplicateId(task.id.clone()));
        }
        validate_task(task)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Dependency, DependencyType};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rejects_duplicate_ids_and_inverted_ranges() {
        let a = Task::new("a", "A", d(2024, 1, 1), d(2024, 1, 2));
        let dup = Task::new("a", "A again", d(2024, 1, 3), d(2024, 1, 4));
        assert_eq!(
            validate_tasks(&[a.clone(), dup]),
            Err(TaskValidationError::DuplicateId("a".into()))
        );

        let mut inverted = Task::new("b", "B", d(2024, 1, 1), d(2024, 1, 2));
        inverted.start_date = d(2024, 1, 5);
        assert!(matches!(
            validate_task(&inverted),
            Err(TaskValidationError::StartAfterEnd { .. })
        ));
    }

    #[test]
    fn mismatched_duration_is_tolerated() {
        let task = Task::new("a", "A", d(2024, 1, 1), d(2024, 1, 2)).with_duration(5);
        assert!(validate_task(&task).is_ok());
        let zero = Task::new("z", "Z", d(2024, 1, 1), d(2024, 1, 1)).with_duration(0);
        assert!(matches!(
            validate_task(&zero),
            Err(TaskValidationError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn rejects_durations_and_lags_beyond_the_bounds() {
        let long = Task::new("a", "A", d(2024, 1, 1), d(2024, 1, 1))
            .with_duration(MAX_DURATION_DAYS + 1);
        assert_eq!(
            validate_task(&long),
            Err(TaskValidationError::DurationOutOfRange {
                task_id: "a".into(),
                duration_days: MAX_DURATION_DAYS + 1,
            })
        );

        let lagged = Task::new("b", "B", d(2024, 1, 1), d(2024, 1, 1))
            .with_dependency(Dependency::finish_to_start("a"))
            .with_dependency(Dependency::new("a", DependencyType::StartToStart, i64::MIN));
        assert_eq!(
            validate_ranges(&lagged),
            Err(TaskValidationError::LagOutOfRange {
                task_id: "b".into(),
                predecessor_id: "a".into(),
                lag_days: i64::MIN,
            })
        );

        let bound = Dependency::new("a", DependencyType::FinishToFinish, -MAX_LAG_DAYS);
        let edge = Task::new("c", "C", d(2024, 1, 1), d(2024, 1, 1)).with_dependency(bound);
        assert!(validate_ranges(&edge).is_ok());
    }
}
