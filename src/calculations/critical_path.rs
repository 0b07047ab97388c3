use crate::calculations::backward_pass::BackwardPass;
use crate::calculations::forward_pass::ForwardPass;
use crate::calendar::add_days;
use crate::graph::{DependencyEdge, ScheduleDag};
use crate::task::{DependencyType, Task, TaskId};
use chrono::NaiveDate;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// CPM figures for one task. Offsets are inclusive days from the project start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub total_float: i64,
    pub free_float: i64,
    pub duration_days: i64,
    pub is_critical: bool,
}

impl ScheduleInfo {
    pub fn early_start_date(&self, project_start: NaiveDate) -> NaiveDate {
        add_days(project_start, self.early_start)
    }

    pub fn early_finish_date(&self, project_start: NaiveDate) -> NaiveDate {
        add_days(project_start, self.early_finish)
    }

    pub fn late_start_date(&self, project_start: NaiveDate) -> NaiveDate {
        add_days(project_start, self.late_start)
    }

    pub fn late_finish_date(&self, project_start: NaiveDate) -> NaiveDate {
        add_days(project_start, self.late_finish)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPathResult {
    /// Zero-float tasks ordered by early start.
    pub critical_path: Vec<TaskId>,
    pub schedule_info: HashMap<TaskId, ScheduleInfo>,
    pub project_duration: i64,
    /// Day zero: the earliest stored start date. `None` for an empty snapshot.
    pub project_start: Option<NaiveDate>,
}

impl CriticalPathResult {
    pub fn empty() -> Self {
        Self {
            critical_path: Vec::new(),
            schedule_info: HashMap::new(),
            project_duration: 0,
            project_start: None,
        }
    }

    pub fn info(&self, task_id: &str) -> Option<&ScheduleInfo> {
        self.schedule_info.get(task_id)
    }

    pub fn is_critical(&self, task_id: &str) -> bool {
        self.info(task_id).is_some_and(|info| info.is_critical)
    }

    pub fn project_finish(&self) -> Option<NaiveDate> {
        self.project_start
            .filter(|_| self.project_duration > 0)
            .map(|start| add_days(start, self.project_duration - 1))
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            task_count: self.schedule_info.len(),
            critical_count: self.critical_path.len(),
            critical_path: self.critical_path.clone(),
            project_duration: self.project_duration,
            project_start: self.project_start,
            project_finish: self.project_finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub task_count: usize,
    pub critical_count: usize,
    pub critical_path: Vec<TaskId>,
    pub project_duration: i64,
    pub project_start: Option<NaiveDate>,
    pub project_finish: Option<NaiveDate>,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("critical={}", self.critical_count));
        parts.push(format!("duration={}d", self.project_duration));
        if let Some(date) = self.project_start {
            parts.push(format!("start={}", date));
        }
        if let Some(date) = self.project_finish {
            parts.push(format!("finish={}", date));
        }
        if !self.critical_path.is_empty() {
            parts.push(format!("crit_path={}", self.critical_path.join("->")));
        }
        parts.join(", ")
    }
}

/// Full CPM schedule: forward pass, backward pass, floats and critical set.
pub fn calculate_critical_path_detailed(tasks: &[Task]) -> CriticalPathResult {
    let Some(project_start) = tasks.iter().map(|task| task.start_date).min() else {
        return CriticalPathResult::empty();
    };

    let dag = ScheduleDag::build(tasks);
    let order = dag.topological_order();

    let early = ForwardPass::new(&dag, &order).execute(project_start);
    let project_end = early.values().map(|&(_, ef)| ef).max().unwrap_or(0);
    let late = BackwardPass::new(&dag, &order).execute(project_end);

    let position: HashMap<NodeIndex, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, &node)| (node, idx))
        .collect();

    let mut schedule_info: HashMap<TaskId, ScheduleInfo> = HashMap::with_capacity(order.len());
    let mut critical: Vec<(i64, usize, TaskId)> = Vec::new();

    for &node in &order {
        let task = dag.task(node);
        let (early_start, early_finish) = early[&node];
        let (late_start, late_finish) = late[&node];
        let total_float = late_start.saturating_sub(early_start);
        let free_float = free_float(&dag, node, &early).unwrap_or(total_float);
        let is_critical = total_float == 0;

        if is_critical {
            critical.push((early_start, position[&node], task.id.clone()));
        }

        schedule_info.insert(
            task.id.clone(),
            ScheduleInfo {
                early_start,
                early_finish,
                late_start,
                late_finish,
                total_float,
                free_float,
                duration_days: task.effective_duration(),
                is_critical,
            },
        );
    }

    critical.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    CriticalPathResult {
        critical_path: critical.into_iter().map(|(_, _, id)| id).collect(),
        schedule_info,
        project_duration: project_end.saturating_add(1),
        project_start: Some(project_start),
    }
}

/// Ids of the zero-float tasks, ordered by early start.
pub fn calculate_critical_path(tasks: &[Task]) -> Vec<TaskId> {
    calculate_critical_path_detailed(tasks).critical_path
}

/// Smallest slack across outgoing edges; `None` for a task without successors.
fn free_float(
    dag: &ScheduleDag<'_>,
    node: NodeIndex,
    early: &HashMap<NodeIndex, (i64, i64)>,
) -> Option<i64> {
    let (early_start, early_finish) = early[&node];
    dag.successors(node)
        .filter_map(|(succ, edge)| {
            early.get(&succ).map(|&(succ_es, succ_ef)| {
                edge_slack(edge, early_start, early_finish, succ_es, succ_ef)
            })
        })
        .min()
}

fn edge_slack(
    edge: DependencyEdge,
    early_start: i64,
    early_finish: i64,
    successor_early_start: i64,
    successor_early_finish: i64,
) -> i64 {
    let lag = edge.lag_days;
    match edge.dependency_type {
        DependencyType::FinishToStart => {
            let constraint = early_finish.saturating_add(lag).saturating_add(1);
            successor_early_start.saturating_sub(constraint)
        }
        DependencyType::StartToStart => {
            successor_early_start.saturating_sub(early_start.saturating_add(lag))
        }
        DependencyType::FinishToFinish => {
            successor_early_finish.saturating_sub(early_finish.saturating_add(lag))
        }
        DependencyType::StartToFinish => {
            successor_early_finish.saturating_sub(early_start.saturating_add(lag))
        }
    }
}
