//! Boundary between serialized task snapshots and engine types.
//!
//! Records keep dates and dependency codes as strings so that bad input is
//! reported through [`ScheduleError`] rather than a generic serde failure,
//! and so unknown dependency codes follow the configured policy.

use crate::calculations::critical_path::{CriticalPathResult, ScheduleInfo};
use crate::calendar;
use crate::config::EngineConfig;
use crate::error::ScheduleError;
use crate::task::{Assignment, Dependency, Task, TaskId};
use crate::task_validation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("invalid data: {0}")]
    InvalidRecord(String),
}

impl From<task_validation::TaskValidationError> for SnapshotError {
    fn from(value: task_validation::TaskValidationError) -> Self {
        Self::Schedule(ScheduleError::InvalidTask(value))
    }
}

impl From<calendar::InvalidDateError> for SnapshotError {
    fn from(value: calendar::InvalidDateError) -> Self {
        Self::Schedule(ScheduleError::InvalidDate(value))
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub predecessor_id: TaskId,
    #[serde(default)]
    pub dependency_type: String,
    #[serde(default)]
    pub lag_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    /// Derived from the date pair when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl TaskRecord {
    pub fn into_task(self, config: &EngineConfig) -> Result<Task, ScheduleError> {
        let start = calendar::parse_date(&self.start_date)?;
        let end = calendar::parse_date(&self.end_date)?;
        let mut task = Task::new(self.id, self.name, start, end);
        if let Some(duration) = self.duration_days {
            task.duration_days = duration;
        }
        for dependency in self.dependencies {
            let dependency_type = config.parse_dependency_type(&dependency.dependency_type)?;
            task.dependencies.push(Dependency::new(
                dependency.predecessor_id,
                dependency_type,
                dependency.lag_days,
            ));
        }
        task.assignments = self.assignments;
        task_validation::validate_ranges(&task)?;
        Ok(task)
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            start_date: calendar::format_date(task.start_date),
            end_date: calendar::format_date(task.end_date),
            duration_days: Some(task.duration_days),
            dependencies: task
                .dependencies
                .iter()
                .map(|dep| DependencyRecord {
                    predecessor_id: dep.predecessor_id.clone(),
                    dependency_type: dep.dependency_type.as_str().to_string(),
                    lag_days: dep.lag_days,
                })
                .collect(),
            assignments: task.assignments.clone(),
        }
    }
}

/// Convert boundary records, validating the result when the config asks for it.
pub fn tasks_from_records(
    records: Vec<TaskRecord>,
    config: &EngineConfig,
) -> SnapshotResult<Vec<Task>> {
    let tasks = records
        .into_iter()
        .map(|record| record.into_task(config))
        .collect::<Result<Vec<_>, _>>()?;
    if config.validate_snapshots {
        task_validation::validate_tasks(&tasks)?;
    }
    Ok(tasks)
}

/// One exported line of a computed schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub task_id: TaskId,
    pub name: String,
    pub duration_days: i64,
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub early_start_date: NaiveDate,
    pub early_finish_date: NaiveDate,
    pub late_start_date: NaiveDate,
    pub late_finish_date: NaiveDate,
    pub total_float: i64,
    pub free_float: i64,
    pub is_critical: bool,
}

impl ScheduleRow {
    fn new(task: &Task, info: &ScheduleInfo, project_start: NaiveDate) -> Self {
        Self {
            task_id: task.id.clone(),
            name: task.name.clone(),
            duration_days: info.duration_days,
            early_start: info.early_start,
            early_finish: info.early_finish,
            late_start: info.late_start,
            late_finish: info.late_finish,
            early_start_date: info.early_start_date(project_start),
            early_finish_date: info.early_finish_date(project_start),
            late_start_date: info.late_start_date(project_start),
            late_finish_date: info.late_finish_date(project_start),
            total_float: info.total_float,
            free_float: info.free_float,
            is_critical: info.is_critical,
        }
    }
}

/// Rows in snapshot order for every task the result covers.
pub fn schedule_rows(result: &CriticalPathResult, tasks: &[Task]) -> Vec<ScheduleRow> {
    let Some(project_start) = result.project_start else {
        return Vec::new();
    };
    tasks
        .iter()
        .filter_map(|task| {
            result
                .info(&task.id)
                .map(|info| ScheduleRow::new(task, info, project_start))
        })
        .collect()
}

pub mod file;

pub use file::{
    load_tasks_from_csv, load_tasks_from_json, save_schedule_to_csv, save_schedule_to_json,
    save_tasks_to_json,
};
