// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::document::TaskMap;
use crate::types::TaskId;

/// Dependency graph over the tasks of one document.
///
/// Nodes are document positions; an edge `a -> b` means task `a` requires
/// task `b`. Dependencies that name no existing task are left out here and
/// reported separately by the validator.
#[derive(Debug, Clone)]
pub struct DagGraph {
    ids: Vec<TaskId>,
    index: HashMap<TaskId, usize>,
    graph: DiGraphMap<usize, ()>,
}

impl DagGraph {
    /// Build the graph from a parsed task map.
    ///
    /// Edges are inserted task by task in dependency-list order, so
    /// neighbour iteration follows the order written in the document.
    pub fn from_tasks(tasks: &TaskMap) -> Self {
        let ids: Vec<TaskId> = tasks.ids().map(str::to_string).collect();
        let index: HashMap<TaskId, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for i in 0..ids.len() {
            graph.add_node(i);
        }

        for (i, task) in tasks.iter().enumerate() {
            for dep in &task.dependencies {
                if let Some(&j) = index.get(dep) {
                    graph.add_edge(i, j, ());
                }
            }
        }

        Self { ids, index, graph }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Task ids in document order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(|s| s.as_str())
    }

    pub fn id_of(&self, node: usize) -> &str {
        &self.ids[node]
    }

    pub fn node_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Resolved dependencies of a node, in the order the document lists them.
    pub(crate) fn dependency_nodes(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    /// Immediate dependencies of a task that exist in the document.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        match self.node_of(id) {
            Some(n) => self.dependency_nodes(n).map(|d| self.id_of(d)).collect(),
            None => Vec::new(),
        }
    }

    /// Tasks (other than `id` itself) that list `id` as a dependency.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        match self.node_of(id) {
            Some(n) => self
                .graph
                .neighbors_directed(n, Direction::Incoming)
                .filter(|&m| m != n)
                .map(|m| self.id_of(m))
                .collect(),
            None => Vec::new(),
        }
    }

    /// In-degree of the reverse dependency relation, self-edges excluded.
    pub fn dependent_count(&self, id: &str) -> usize {
        self.dependents_of(id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Task;

    fn task(id: &str, deps: &[&str]) -> Task {
        let mut t = Task::new(id, id);
        t.dependencies = deps.iter().map(|d| d.to_string()).collect();
        t
    }

    #[test]
    fn adjacency_in_both_directions() {
        let tasks: TaskMap = [
            task("TASK-001", &[]),
            task("TASK-002", &["TASK-001"]),
            task("TASK-003", &["TASK-002", "TASK-001", "TASK-404"]),
        ]
        .into_iter()
        .collect();
        let g = DagGraph::from_tasks(&tasks);

        assert_eq!(g.len(), 3);
        assert_eq!(g.dependencies_of("TASK-003"), vec!["TASK-002", "TASK-001"]);
        let mut dependents = g.dependents_of("TASK-001");
        dependents.sort();
        assert_eq!(dependents, vec!["TASK-002", "TASK-003"]);
        assert_eq!(g.dependent_count("TASK-003"), 0);
        assert!(g.dependencies_of("TASK-404").is_empty());
    }

    #[test]
    fn self_dependency_is_not_a_dependent() {
        let tasks: TaskMap = [task("TASK-001", &["TASK-001"])].into_iter().collect();
        let g = DagGraph::from_tasks(&tasks);
        assert_eq!(g.dependencies_of("TASK-001"), vec!["TASK-001"]);
        assert_eq!(g.dependent_count("TASK-001"), 0);
    }
}
