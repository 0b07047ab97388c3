use crate::calculations::dependency_dates::calculate_successor_dates;
use crate::error::ScheduleError;
use crate::graph::ScheduleDag;
use crate::task::{DateRange, Task, TaskId};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, trace};

/// One cascaded date move, with the dates it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateChange {
    pub task_id: TaskId,
    pub previous: DateRange,
    pub updated: DateRange,
}

/// Recompute dates for every transitive successor of `changed_task_id`.
///
/// `tasks` must already carry the changed task's new dates. Each affected
/// successor takes the latest start demanded by any of its predecessors,
/// using dates computed earlier in the same pass where they exist. Only
/// tasks whose dates move are returned.
pub fn recalculate_task_dates(
    changed_task_id: &str,
    tasks: &[Task],
) -> HashMap<TaskId, DateRange> {
    let dag = ScheduleDag::build(tasks);
    let Some(changed) = dag.node(changed_task_id) else {
        debug!(task_id = changed_task_id, "cascade requested for unknown task");
        return HashMap::new();
    };

    let updates = CascadePass::new(&dag, changed).run();
    updates
        .into_iter()
        .map(|(node, range)| (dag.task(node).id.clone(), range))
        .collect()
}

/// [`recalculate_task_dates`] paired with the stored dates, sorted by task id.
pub fn cascade_changes(changed_task_id: &str, tasks: &[Task]) -> Vec<DateChange> {
    let updates = recalculate_task_dates(changed_task_id, tasks);
    let mut changes: Vec<DateChange> = tasks
        .iter()
        .filter_map(|task| {
            updates.get(&task.id).map(|updated| DateChange {
                task_id: task.id.clone(),
                previous: task.date_range(),
                updated: *updated,
            })
        })
        .collect();
    changes.sort_by(|a, b| a.task_id.cmp(&b.task_id));
    changes.dedup_by(|a, b| a.task_id == b.task_id);
    changes
}

/// Copies of `tasks` with `updates` applied. Durations are left untouched.
pub fn apply_date_updates(tasks: &[Task], updates: &HashMap<TaskId, DateRange>) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            if let Some(range) = updates.get(&task.id) {
                task.start_date = range.start_date;
                task.end_date = range.end_date;
            }
            task
        })
        .collect()
}

/// False when adding `predecessor_id -> successor_id` would close a cycle.
pub fn validate_dependency_no_cycle(
    predecessor_id: &str,
    successor_id: &str,
    tasks: &[Task],
) -> bool {
    if predecessor_id == successor_id {
        return false;
    }
    let dag = ScheduleDag::build(tasks);
    match (dag.node(predecessor_id), dag.node(successor_id)) {
        (Some(pred), Some(succ)) => !dag.reaches(succ, pred),
        _ => true,
    }
}

/// Checked form of [`validate_dependency_no_cycle`] that also requires both
/// tasks to exist.
pub fn ensure_dependency_no_cycle(
    predecessor_id: &str,
    successor_id: &str,
    tasks: &[Task],
) -> Result<(), ScheduleError> {
    for id in [predecessor_id, successor_id] {
        if !tasks.iter().any(|task| task.id == id) {
            return Err(ScheduleError::UnknownTask(id.to_string()));
        }
    }
    if validate_dependency_no_cycle(predecessor_id, successor_id, tasks) {
        Ok(())
    } else {
        Err(ScheduleError::DependencyCycle {
            predecessor_id: predecessor_id.to_string(),
            successor_id: successor_id.to_string(),
        })
    }
}

struct CascadePass<'d, 'a> {
    dag: &'d ScheduleDag<'a>,
    changed: NodeIndex,
    updates: HashMap<NodeIndex, DateRange>,
    dirty: HashSet<NodeIndex>,
    processed: HashSet<NodeIndex>,
}

impl<'d, 'a> CascadePass<'d, 'a> {
    fn new(dag: &'d ScheduleDag<'a>, changed: NodeIndex) -> Self {
        Self {
            dag,
            changed,
            updates: HashMap::new(),
            dirty: HashSet::new(),
            processed: HashSet::new(),
        }
    }

    fn run(mut self) -> HashMap<NodeIndex, DateRange> {
        let dag = self.dag;
        let affected = self.discover_affected();
        if affected.is_empty() {
            return self.updates;
        }
        let in_affected: HashSet<NodeIndex> = affected.iter().copied().collect();

        // Pending predecessor counts restricted to the affected subgraph.
        let mut pending: HashMap<NodeIndex, usize> = HashMap::with_capacity(affected.len());
        for &node in &affected {
            let count = dag
                .predecessors(node)
                .filter(|(pred, _)| in_affected.contains(pred))
                .count();
            pending.insert(node, count);
        }

        let mut ready: VecDeque<NodeIndex> = affected
            .iter()
            .copied()
            .filter(|node| pending.get(node) == Some(&0))
            .collect();

        loop {
            while let Some(node) = ready.pop_front() {
                if !self.processed.insert(node) {
                    continue;
                }
                self.settle(node);
                for (succ, _) in dag.successors(node) {
                    if let Some(count) = pending.get_mut(&succ) {
                        *count = count.saturating_sub(1);
                        if *count == 0 && !self.processed.contains(&succ) {
                            ready.push_back(succ);
                        }
                    }
                }
            }

            // Anything left sits on a cycle; release it in discovery order.
            match affected
                .iter()
                .find(|node| !self.processed.contains(*node))
            {
                Some(&node) => {
                    trace!(task_id = %dag.task(node).id, "releasing cyclic task");
                    ready.push_back(node);
                }
                None => break,
            }
        }

        self.updates
    }

    /// Breadth-first discovery of every transitive successor, excluding the
    /// changed task itself.
    fn discover_affected(&mut self) -> Vec<NodeIndex> {
        let dag = self.dag;
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        for (succ, _) in dag.successors(self.changed) {
            self.dirty.insert(succ);
            queue.push_back(succ);
        }
        while let Some(node) = queue.pop_front() {
            if node == self.changed || !seen.insert(node) {
                continue;
            }
            order.push(node);
            for (succ, _) in dag.successors(node) {
                queue.push_back(succ);
            }
        }
        order
    }

    fn settle(&mut self, node: NodeIndex) {
        if !self.dirty.contains(&node) {
            return;
        }
        let dag = self.dag;
        let task = dag.task(node);
        let Some(required) = self.constrained_dates(node) else {
            return;
        };
        if required == task.date_range() {
            return;
        }
        debug!(
            task_id = %task.id,
            from = %task.date_range(),
            to = %required,
            "cascade moved task"
        );
        self.updates.insert(node, required);
        for (succ, _) in dag.successors(node) {
            self.dirty.insert(succ);
        }
    }

    /// Latest-starting placement over all predecessor constraints.
    fn constrained_dates(&self, node: NodeIndex) -> Option<DateRange> {
        let duration = self.dag.task(node).effective_duration();
        self.dag
            .predecessors(node)
            .map(|(pred, edge)| {
                let pred_range = self.current_range(pred);
                calculate_successor_dates(
                    pred_range.start_date,
                    pred_range.end_date,
                    duration,
                    edge.dependency_type,
                    edge.lag_days,
                )
            })
            .max_by_key(|range| range.start_date)
    }

    fn current_range(&self, node: NodeIndex) -> DateRange {
        self.updates
            .get(&node)
            .copied()
            .unwrap_or_else(|| self.dag.task(node).date_range())
    }
}
