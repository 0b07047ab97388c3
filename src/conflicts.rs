//! Double-booking checks for employees assigned to overlapping tasks.
//!
//! Assignments carry no dates of their own; a task's start/end range is what
//! an assigned employee is booked for.

use crate::calendar;
use crate::task::{EmployeeId, Task, TaskId};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// An existing booking that collides with a proposed range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub task_id: TaskId,
    pub task_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub overlap_days: i64,
}

/// A task together with the project it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTask {
    pub project_id: String,
    pub project_name: String,
    pub task: Task,
}

impl ProjectTask {
    pub fn new(
        project_id: impl Into<String>,
        project_name: impl Into<String>,
        task: Task,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            project_name: project_name.into(),
            task,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedTask {
    pub task_id: TaskId,
    pub task_name: String,
    pub project_id: String,
    pub project_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&ProjectTask> for BookedTask {
    fn from(entry: &ProjectTask) -> Self {
        Self {
            task_id: entry.task.id.clone(),
            task_name: entry.task.name.clone(),
            project_id: entry.project_id.clone(),
            project_name: entry.project_name.clone(),
            start_date: entry.task.start_date,
            end_date: entry.task.end_date,
        }
    }
}

/// Two of one employee's tasks whose ranges overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPair {
    pub employee_id: EmployeeId,
    pub first: BookedTask,
    pub second: BookedTask,
    pub overlap_days: i64,
}

/// Inclusive range overlap: `start1 <= end2 && start2 <= end1`.
pub fn date_ranges_overlap(
    start1: NaiveDate,
    end1: NaiveDate,
    start2: NaiveDate,
    end2: NaiveDate,
) -> bool {
    start1 <= end2 && start2 <= end1
}

/// Shared calendar days of two inclusive ranges; zero when they are disjoint.
pub fn overlap_days(
    start1: NaiveDate,
    end1: NaiveDate,
    start2: NaiveDate,
    end2: NaiveDate,
) -> i64 {
    if !date_ranges_overlap(start1, end1, start2, end2) {
        return 0;
    }
    calendar::duration_between(start1.max(start2), end1.min(end2))
}

/// Tasks already booking `employee_id` that overlap the proposed range.
///
/// `exclude_task_id` skips the task whose own assignment is being checked.
pub fn detect_employee_conflicts(
    employee_id: &str,
    proposed_start: NaiveDate,
    proposed_end: NaiveDate,
    tasks: &[Task],
    exclude_task_id: Option<&str>,
) -> Vec<ConflictInfo> {
    tasks
        .iter()
        .filter(|task| exclude_task_id != Some(task.id.as_str()))
        .filter(|task| task.is_assigned_to(employee_id))
        .filter(|task| {
            date_ranges_overlap(task.start_date, task.end_date, proposed_start, proposed_end)
        })
        .map(|task| ConflictInfo {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            start_date: task.start_date,
            end_date: task.end_date,
            overlap_days: overlap_days(
                task.start_date,
                task.end_date,
                proposed_start,
                proposed_end,
            ),
        })
        .collect()
}

pub fn has_employee_conflict(
    employee_id: &str,
    proposed_start: NaiveDate,
    proposed_end: NaiveDate,
    tasks: &[Task],
    exclude_task_id: Option<&str>,
) -> bool {
    tasks
        .iter()
        .filter(|task| exclude_task_id != Some(task.id.as_str()))
        .any(|task| {
            task.is_assigned_to(employee_id)
                && date_ranges_overlap(task.start_date, task.end_date, proposed_start, proposed_end)
        })
}

/// Every overlapping pair among the tasks assigned to `employee_id`.
///
/// Quadratic in the number of that employee's tasks; callers bound the input.
pub fn get_all_employee_conflicts(
    employee_id: &str,
    tasks_with_projects: &[ProjectTask],
) -> Vec<ConflictPair> {
    let assigned: Vec<&ProjectTask> = tasks_with_projects
        .iter()
        .filter(|entry| entry.task.is_assigned_to(employee_id))
        .collect();

    let mut pairs = Vec::new();
    for (i, first) in assigned.iter().enumerate() {
        for second in &assigned[i + 1..] {
            let (a, b) = (&first.task, &second.task);
            if !date_ranges_overlap(a.start_date, a.end_date, b.start_date, b.end_date) {
                continue;
            }
            pairs.push(ConflictPair {
                employee_id: employee_id.to_string(),
                first: BookedTask::from(*first),
                second: BookedTask::from(*second),
                overlap_days: overlap_days(a.start_date, a.end_date, b.start_date, b.end_date),
            });
        }
    }
    debug!(
        employee_id,
        assigned = assigned.len(),
        conflicts = pairs.len(),
        "employee conflict scan finished"
    );
    pairs
}

/// Conflict pairs for every assigned employee, keyed by employee id.
///
/// Employees with no conflicts are omitted. Each employee's scan is
/// independent, so the scans run on the rayon pool.
pub fn conflict_report(
    tasks_with_projects: &[ProjectTask],
) -> BTreeMap<EmployeeId, Vec<ConflictPair>> {
    let employees: BTreeSet<&str> = tasks_with_projects
        .iter()
        .flat_map(|entry| entry.task.assignments.iter())
        .map(|assignment| assignment.employee_id.as_str())
        .collect();

    employees
        .into_par_iter()
        .map(|employee_id| {
            (
                employee_id.to_string(),
                get_all_employee_conflicts(employee_id, tasks_with_projects),
            )
        })
        .filter(|(_, pairs)| !pairs.is_empty())
        .collect()
}
