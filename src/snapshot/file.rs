use super::{
    DependencyRecord, ScheduleRow, SnapshotError, SnapshotResult, TaskRecord, schedule_rows,
    tasks_from_records,
};
use crate::calculations::critical_path::{CriticalPathResult, ScheduleSummary};
use crate::config::EngineConfig;
use crate::task::{Assignment, Task};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::debug;

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Wrapped { tasks: Vec<TaskRecord> },
    Bare(Vec<TaskRecord>),
}

impl SnapshotDocument {
    fn into_records(self) -> Vec<TaskRecord> {
        match self {
            SnapshotDocument::Wrapped { tasks } | SnapshotDocument::Bare(tasks) => tasks,
        }
    }
}

/// Read tasks from `{"tasks": [...]}` or a bare JSON array.
pub fn load_tasks_from_json<P: AsRef<Path>>(
    path: P,
    config: &EngineConfig,
) -> SnapshotResult<Vec<Task>> {
    let file = File::open(path.as_ref())?;
    let document: SnapshotDocument = serde_json::from_reader(file)?;
    let tasks = tasks_from_records(document.into_records(), config)?;
    debug!(path = %path.as_ref().display(), tasks = tasks.len(), "loaded json snapshot");
    Ok(tasks)
}

pub fn save_tasks_to_json<P: AsRef<Path>>(tasks: &[Task], path: P) -> SnapshotResult<()> {
    let document = SnapshotDocument::Wrapped {
        tasks: tasks.iter().map(TaskRecord::from).collect(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &document)?;
    Ok(())
}

/// Flat CSV form of a task. Dependencies are `pred:TYPE:lag` entries and
/// assignments `employee:planned:actual` entries, both `;`-separated.
#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    start_date: String,
    end_date: String,
    #[serde(default)]
    duration_days: String,
    #[serde(default)]
    dependencies: String,
    #[serde(default)]
    assignments: String,
}

impl TaskCsvRecord {
    fn into_record(self) -> SnapshotResult<TaskRecord> {
        Ok(TaskRecord {
            duration_days: parse_i64(&self.duration_days)?,
            dependencies: split_dependencies(&self.dependencies)?,
            assignments: split_assignments(&self.assignments)?,
            id: self.id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(
    path: P,
    config: &EngineConfig,
) -> SnapshotResult<Vec<Task>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut records = Vec::new();
    for row in reader.deserialize::<TaskCsvRecord>() {
        records.push(row?.into_record()?);
    }
    if records.is_empty() {
        return Err(SnapshotError::InvalidRecord(
            "CSV file contained no tasks".into(),
        ));
    }
    let tasks = tasks_from_records(records, config)?;
    debug!(path = %path.as_ref().display(), tasks = tasks.len(), "loaded csv snapshot");
    Ok(tasks)
}

#[derive(Serialize)]
struct ScheduleReport<'a> {
    summary: ScheduleSummary,
    tasks: &'a [ScheduleRow],
}

pub fn save_schedule_to_json<P: AsRef<Path>>(
    result: &CriticalPathResult,
    tasks: &[Task],
    path: P,
) -> SnapshotResult<()> {
    let rows = schedule_rows(result, tasks);
    let report = ScheduleReport {
        summary: result.summary(),
        tasks: &rows,
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &report)?;
    Ok(())
}

pub fn save_schedule_to_csv<P: AsRef<Path>>(
    result: &CriticalPathResult,
    tasks: &[Task],
    path: P,
) -> SnapshotResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in schedule_rows(result, tasks) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_i64(input: &str) -> SnapshotResult<Option<i64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|e| SnapshotError::InvalidRecord(format!("invalid integer '{input}': {e}")))
}

fn parse_f64(input: &str) -> SnapshotResult<f64> {
    if input.trim().is_empty() {
        return Ok(0.0);
    }
    input
        .trim()
        .parse::<f64>()
        .map_err(|e| SnapshotError::InvalidRecord(format!("invalid float '{input}': {e}")))
}

fn entries(input: &str) -> impl Iterator<Item = &str> {
    input.split(';').map(str::trim).filter(|part| !part.is_empty())
}

fn split_dependencies(input: &str) -> SnapshotResult<Vec<DependencyRecord>> {
    entries(input)
        .map(|entry| -> SnapshotResult<DependencyRecord> {
            let mut fields = entry.split(':').map(str::trim);
            let predecessor_id = fields
                .next()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    SnapshotError::InvalidRecord(format!("dependency '{entry}' has no predecessor"))
                })?
                .to_string();
            let dependency_type = fields.next().unwrap_or_default().to_string();
            let lag_days = parse_i64(fields.next().unwrap_or_default())?.unwrap_or(0);
            Ok(DependencyRecord {
                predecessor_id,
                dependency_type,
                lag_days,
            })
        })
        .collect()
}

fn split_assignments(input: &str) -> SnapshotResult<Vec<Assignment>> {
    entries(input)
        .map(|entry| -> SnapshotResult<Assignment> {
            let mut fields = entry.split(':').map(str::trim);
            let employee_id = fields
                .next()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    SnapshotError::InvalidRecord(format!("assignment '{entry}' has no employee"))
                })?
                .to_string();
            Ok(Assignment {
                employee_id,
                planned_hours: parse_f64(fields.next().unwrap_or_default())?,
                actual_hours: parse_f64(fields.next().unwrap_or_default())?,
            })
        })
        .collect()
}
