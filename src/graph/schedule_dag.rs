use crate::task::{DependencyType, Task};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Edge weight: the constraint carried by a successor's dependency record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    pub dependency_type: DependencyType,
    pub lag_days: i64,
}

/// Adjacency rebuilt from a task snapshot on every call.
///
/// Node weights are positions in the borrowed task slice; edges run
/// predecessor -> successor. Dependencies on ids absent from the snapshot
/// are dropped while building.
pub struct ScheduleDag<'a> {
    pub tasks: &'a [Task],
    pub graph: DiGraph<usize, DependencyEdge>,
    pub id_to_index: HashMap<&'a str, NodeIndex>,
}

impl<'a> ScheduleDag<'a> {
    pub fn build(tasks: &'a [Task]) -> Self {
        let mut graph: DiGraph<usize, DependencyEdge> = DiGraph::with_capacity(tasks.len(), 0);
        let mut id_to_index: HashMap<&'a str, NodeIndex> = HashMap::with_capacity(tasks.len());

        // Add nodes first
        for (position, task) in tasks.iter().enumerate() {
            let node_ix = graph.add_node(position);
            // Later duplicates win; validation rejects them upstream.
            id_to_index.insert(task.id.as_str(), node_ix);
        }

        // Add edges: pred -> task
        for task in tasks {
            let Some(&succ_ix) = id_to_index.get(task.id.as_str()) else {
                continue;
            };
            for dependency in &task.dependencies {
                match id_to_index.get(dependency.predecessor_id.as_str()) {
                    Some(&pred_ix) => {
                        graph.add_edge(
                            pred_ix,
                            succ_ix,
                            DependencyEdge {
                                dependency_type: dependency.dependency_type,
                                lag_days: dependency.lag_days,
                            },
                        );
                    }
                    None => debug!(
                        task_id = %task.id,
                        predecessor_id = %dependency.predecessor_id,
                        "skipping dependency on unknown task"
                    ),
                }
            }
        }

        Self {
            tasks,
            graph,
            id_to_index,
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, task_id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(task_id).copied()
    }

    pub fn task(&self, node: NodeIndex) -> &'a Task {
        &self.tasks[self.graph[node]]
    }

    pub fn predecessors(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, DependencyEdge)> + '_ {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| (edge.source(), *edge.weight()))
    }

    pub fn successors(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, DependencyEdge)> + '_ {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge.target(), *edge.weight()))
    }

    pub fn has_predecessors(&self, node: NodeIndex) -> bool {
        self.predecessors(node).next().is_some()
    }

    pub fn has_successors(&self, node: NodeIndex) -> bool {
        self.successors(node).next().is_some()
    }

    /// Predecessor-first ordering via depth-first visits in snapshot order.
    ///
    /// A node met again while still on the visit stack belongs to a cycle;
    /// it is treated as already ordered instead of failing.
    pub fn topological_order(&self) -> Vec<NodeIndex> {
        let count = self.graph.node_count();
        let mut visited = vec![false; count];
        let mut visiting = vec![false; count];
        let mut order = Vec::with_capacity(count);
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>)> = Vec::new();

        for root in self.graph.node_indices() {
            if visited[root.index()] {
                continue;
            }
            visiting[root.index()] = true;
            stack.push((root, self.predecessor_nodes(root)));

            while let Some((node, pending)) = stack.last_mut() {
                let node = *node;
                match pending.pop() {
                    Some(pred) => {
                        if visited[pred.index()] {
                            continue;
                        }
                        if visiting[pred.index()] {
                            trace!(
                                task_id = %self.task(pred).id,
                                "cycle member reached during ordering"
                            );
                            continue;
                        }
                        visiting[pred.index()] = true;
                        let preds = self.predecessor_nodes(pred);
                        stack.push((pred, preds));
                    }
                    None => {
                        stack.pop();
                        visiting[node.index()] = false;
                        visited[node.index()] = true;
                        order.push(node);
                    }
                }
            }
        }
        order
    }

    /// True when `to` can be reached from `from` along successor edges.
    pub fn reaches(&self, from: NodeIndex, to: NodeIndex) -> bool {
        let mut bfs = Bfs::new(&self.graph, from);
        while let Some(node) = bfs.next(&self.graph) {
            if node == to {
                return true;
            }
        }
        false
    }

    fn predecessor_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields newest edges first, so popping visits them in insertion order.
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .collect()
    }
}
