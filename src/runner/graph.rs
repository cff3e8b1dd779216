// ABOUTME: Dependency graph resolution and execution planning
// ABOUTME: Restricts the registered set to the requested targets, detects cycles, and batches

use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use petgraph::{Direction, Graph};
use std::collections::{HashMap, HashSet};

use super::error::{Result, RunnerError};
use super::task::TaskSet;

#[derive(Debug)]
pub struct DependencyGraph {
    graph: Graph<String, ()>,
    // Node indices in registration order; the tie-break order for siblings.
    ordered_nodes: Vec<NodeIndex>,
    task_indices: HashMap<String, NodeIndex>,
}

/// Batched execution plan. Batches run sequentially; tasks within a batch
/// have no dependency relationship and may run concurrently.
#[derive(Debug)]
pub struct ExecutionPlan {
    pub batches: Vec<Vec<String>>,
    pub total_tasks: usize,
}

impl DependencyGraph {
    /// Build a graph covering the requested targets and their transitive
    /// prerequisites. Fails with `UnknownTask` when a target or a declared
    /// prerequisite is not registered.
    pub fn for_targets(tasks: &TaskSet, targets: &[String]) -> Result<Self> {
        let mut selected = HashSet::new();
        let mut stack: Vec<String> = Vec::new();

        for target in targets {
            if !tasks.contains(target) {
                return Err(RunnerError::UnknownTask {
                    name: target.clone(),
                });
            }
            stack.push(target.clone());
        }

        while let Some(name) = stack.pop() {
            if !selected.insert(name.clone()) {
                continue;
            }
            let task = tasks.get(&name).ok_or_else(|| RunnerError::UnknownTask {
                name: name.clone(),
            })?;
            for prerequisite in &task.prerequisites {
                stack.push(prerequisite.clone());
            }
        }

        let mut graph = Graph::new();
        let mut ordered_nodes = Vec::new();
        let mut task_indices = HashMap::new();

        // Add nodes in registration order so sibling tie-break stays stable.
        for task in tasks.iter() {
            if selected.contains(&task.name) {
                let node_index = graph.add_node(task.name.clone());
                ordered_nodes.push(node_index);
                task_indices.insert(task.name.clone(), node_index);
            }
        }

        for task in tasks.iter() {
            if let Some(&task_node) = task_indices.get(&task.name) {
                for prerequisite in &task.prerequisites {
                    let &dep_node = task_indices.get(prerequisite).ok_or_else(|| {
                        RunnerError::UnknownTask {
                            name: prerequisite.clone(),
                        }
                    })?;
                    graph.add_edge(dep_node, task_node, ());
                }
            }
        }

        Ok(Self {
            graph,
            ordered_nodes,
            task_indices,
        })
    }

    /// Create an execution plan with batched parallel execution. Fails with
    /// `CyclicDependency` before anything runs if the graph has a cycle.
    pub fn create_execution_plan(&self) -> Result<ExecutionPlan> {
        toposort(&self.graph, None).map_err(|cycle| RunnerError::CyclicDependency {
            tasks: vec![self.graph[cycle.node_id()].clone()],
        })?;

        let batches = self.create_execution_batches();
        let total_tasks = self.task_indices.len();

        Ok(ExecutionPlan {
            batches,
            total_tasks,
        })
    }

    /// Group tasks into batches whose prerequisites are all satisfied by
    /// earlier batches.
    fn create_execution_batches(&self) -> Vec<Vec<String>> {
        let mut batches = Vec::new();
        let mut completed: HashSet<NodeIndex> = HashSet::new();
        let mut remaining: Vec<NodeIndex> = self.ordered_nodes.clone();

        while !remaining.is_empty() {
            let mut current_batch = Vec::new();
            let mut batch_nodes = Vec::new();

            for &node_idx in &remaining {
                let prerequisites_met = self
                    .graph
                    .neighbors_directed(node_idx, Direction::Incoming)
                    .all(|dep_node| completed.contains(&dep_node));

                if prerequisites_met {
                    current_batch.push(self.graph[node_idx].clone());
                    batch_nodes.push(node_idx);
                }
            }

            if current_batch.is_empty() {
                // Unreachable once toposort succeeded.
                break;
            }

            remaining.retain(|n| !batch_nodes.contains(n));
            completed.extend(batch_nodes);
            batches.push(current_batch);
        }

        batches
    }
}

impl ExecutionPlan {
    /// Largest batch size; the maximum possible parallelism.
    pub fn max_parallelism(&self) -> usize {
        self.batches.iter().map(|b| b.len()).max().unwrap_or(0)
    }

    pub fn execution_depth(&self) -> usize {
        self.batches.len()
    }

    pub fn contains_task(&self, task_name: &str) -> bool {
        self.batches
            .iter()
            .any(|batch| batch.iter().any(|t| t == task_name))
    }
}
