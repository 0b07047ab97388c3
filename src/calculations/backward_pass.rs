use crate::calculations::dependency_dates::constrained_late_finish;
use crate::graph::ScheduleDag;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

pub struct BackwardPass<'d, 'a> {
    dag: &'d ScheduleDag<'a>,
    order: &'d [NodeIndex],
}

impl<'d, 'a> BackwardPass<'d, 'a> {
    pub fn new(dag: &'d ScheduleDag<'a>, order: &'d [NodeIndex]) -> Self {
        Self { dag, order }
    }

    /// Late start/finish offsets, walking `order` in reverse from `project_end`.
    pub fn execute(&self, project_end: i64) -> HashMap<NodeIndex, (i64, i64)> {
        // LS/LF keyed by node
        let mut results: HashMap<NodeIndex, (i64, i64)> =
            HashMap::with_capacity(self.order.len());

        for &node in self.order.iter().rev() {
            let duration = self.dag.task(node).effective_duration();

            let late_finish = self
                .dag
                .successors(node)
                .filter_map(|(succ, edge)| {
                    results.get(&succ).map(|&(succ_ls, succ_lf)| {
                        constrained_late_finish(
                            edge.dependency_type,
                            edge.lag_days,
                            succ_ls,
                            succ_lf,
                            duration,
                        )
                    })
                })
                .min()
                .unwrap_or(project_end);

            results.insert(node, (late_finish.saturating_sub(duration - 1), late_finish));
        }

        results
    }
}
