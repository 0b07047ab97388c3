use crate::calculations::dependency_dates::constrained_early_start;
use crate::calendar;
use crate::graph::ScheduleDag;
use chrono::NaiveDate;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Early start/finish as inclusive day offsets from the project start.
pub struct ForwardPass<'d, 'a> {
    dag: &'d ScheduleDag<'a>,
    order: &'d [NodeIndex],
}

impl<'d, 'a> ForwardPass<'d, 'a> {
    pub fn new(dag: &'d ScheduleDag<'a>, order: &'d [NodeIndex]) -> Self {
        Self { dag, order }
    }

    pub fn execute(&self, project_start: NaiveDate) -> HashMap<NodeIndex, (i64, i64)> {
        let mut results: HashMap<NodeIndex, (i64, i64)> =
            HashMap::with_capacity(self.order.len());

        for &node in self.order {
            let task = self.dag.task(node);
            let duration = task.effective_duration();

            // Latest constraint wins; predecessors not yet placed (cycles) are ignored.
            let early_start = self
                .dag
                .predecessors(node)
                .filter_map(|(pred, edge)| {
                    results.get(&pred).map(|&(pred_es, pred_ef)| {
                        constrained_early_start(
                            edge.dependency_type,
                            edge.lag_days,
                            pred_es,
                            pred_ef,
                            duration,
                        )
                    })
                })
                .max()
                .unwrap_or_else(|| calendar::days_between(project_start, task.start_date));

            results.insert(node, (early_start, early_start.saturating_add(duration - 1)));
        }

        results
    }
}
