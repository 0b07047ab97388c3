use crate::calendar;
use crate::error::ScheduleError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TaskId = String;
pub type EmployeeId = String;

/// How a successor's dates are tied to its predecessor's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,
    #[serde(rename = "SS")]
    StartToStart,
    #[serde(rename = "FF")]
    FinishToFinish,
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
            DependencyType::StartToFinish => "SF",
        }
    }

    pub fn variants() -> [DependencyType; 4] {
        [
            DependencyType::FinishToStart,
            DependencyType::StartToStart,
            DependencyType::FinishToFinish,
            DependencyType::StartToFinish,
        ]
    }

    /// True when the constraint pins the successor's start rather than its end.
    pub fn constrains_start(&self) -> bool {
        matches!(
            self,
            DependencyType::FinishToStart | DependencyType::StartToStart
        )
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FS" => Ok(DependencyType::FinishToStart),
            "SS" => Ok(DependencyType::StartToStart),
            "FF" => Ok(DependencyType::FinishToFinish),
            "SF" => Ok(DependencyType::StartToFinish),
            _ => Err(ScheduleError::UnknownDependencyType(s.to_string())),
        }
    }
}

/// Incoming edge, stored on the successor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub predecessor_id: TaskId,
    #[serde(default)]
    pub dependency_type: DependencyType,
    /// Signed offset in days. Negative values allow overlap.
    #[serde(default)]
    pub lag_days: i64,
}

impl Dependency {
    pub fn new(
        predecessor_id: impl Into<TaskId>,
        dependency_type: DependencyType,
        lag_days: i64,
    ) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            dependency_type,
            lag_days,
        }
    }

    pub fn finish_to_start(predecessor_id: impl Into<TaskId>) -> Self {
        Self::new(predecessor_id, DependencyType::FinishToStart, 0)
    }

    pub fn with_lag(mut self, lag_days: i64) -> Self {
        self.lag_days = lag_days;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub planned_hours: f64,
    #[serde(default)]
    pub actual_hours: f64,
}

impl Assignment {
    pub fn new(employee_id: impl Into<EmployeeId>, planned_hours: f64) -> Self {
        Self {
            employee_id: employee_id.into(),
            planned_hours,
            actual_hours: 0.0,
        }
    }
}

/// Inclusive calendar-date pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        Ok(Self::new(
            calendar::parse_date(start)?,
            calendar::parse_date(end)?,
        ))
    }

    pub fn duration_days(&self) -> i64 {
        calendar::duration_between(self.start_date, self.end_date)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Authoritative when dates are derived from a constraint.
    pub duration_days: i64,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            duration_days: calendar::duration_between(start_date, end_date),
            dependencies: Vec::new(),
            assignments: Vec::new(),
        }
    }

    pub fn with_duration(mut self, duration_days: i64) -> Self {
        self.duration_days = duration_days;
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Duration used by the engine; never below one day.
    pub fn effective_duration(&self) -> i64 {
        self.duration_days.max(1)
    }

    pub fn is_assigned_to(&self, employee_id: &str) -> bool {
        self.assignments
            .iter()
            .any(|assignment| assignment.employee_id == employee_id)
    }

    pub fn depends_on(&self, predecessor_id: &str) -> bool {
        self.dependencies
            .iter()
            .any(|dep| dep.predecessor_id == predecessor_id)
    }
}
