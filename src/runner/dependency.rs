//! Dependency graph for execution ordering.
//!
//! Nodes are plain string identifiers (action names or qualified step
//! references). An edge `from -> to` records that `from` depends on `to`.
//! The graph may contain cycles while it is being built; call
//! [`DependencyGraph::is_cyclic`] or [`DependencyGraph::find_cycle`]
//! before asking for [`DependencyGraph::fronts`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::{J3nError, Result};

/// Directed graph from node to its direct dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node without dependencies. No-op if it already exists.
    pub fn add_node(&mut self, node: impl Into<String>) {
        self.nodes.entry(node.into()).or_default();
    }

    /// Record that `from` depends on `to`.
    ///
    /// Creates `from` if needed. `to` is not registered; callers keep
    /// referential integrity themselves.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let to = to.into();
        let deps = self.nodes.entry(from.into()).or_default();
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    /// Copy the subgraph reachable from `root` in `other` into this graph.
    pub fn add_reachable(&mut self, other: &DependencyGraph, root: &str) {
        let mut visited: HashSet<String> = HashSet::new();
        let mut to_visit = vec![root.to_string()];

        while let Some(node) = to_visit.pop() {
            if !visited.insert(node.clone()) {
                continue;
            }
            self.add_node(node.clone());

            for dep in other.dependencies_of(&node) {
                self.add_node(dep.clone());
                self.add_edge(node.clone(), dep.clone());
                to_visit.push(dep.clone());
            }
        }
    }

    /// Direct dependencies of a node (empty if unknown).
    pub fn dependencies_of(&self, node: &str) -> &[String] {
        self.nodes.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if a node exists in the graph.
    pub fn contains(&self, node: &str) -> bool {
        self.nodes.contains_key(node)
    }

    /// All node identifiers, sorted.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Get the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether any node can reach itself through its dependencies.
    pub fn is_cyclic(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The path starts and ends with the same node, e.g. `["a", "b", "a"]`.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Visiting,
            Visited,
        }

        fn dfs<'a>(
            node: &'a str,
            graph: &'a DependencyGraph,
            state: &mut HashMap<&'a str, State>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            state.insert(node, State::Visiting);
            path.push(node);

            for dep in graph.dependencies_of(node) {
                match state.get(dep.as_str()) {
                    Some(State::Visiting) => {
                        let start = path
                            .iter()
                            .position(|s| *s == dep.as_str())
                            .unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|s| s.to_string()).collect();
                        cycle.push(dep.clone());
                        return Some(cycle);
                    }
                    Some(State::Visited) => {}
                    None => {
                        if let Some(cycle) = dfs(dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                }
            }

            path.pop();
            state.insert(node, State::Visited);
            None
        }

        let mut state: HashMap<&str, State> = HashMap::new();
        let mut path = Vec::new();

        // Every node is a potential root so disconnected cycles are found.
        for node in self.nodes.keys() {
            if !state.contains_key(node.as_str()) {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    /// Layered topological order.
    ///
    /// Each front holds the nodes whose dependencies all lie in earlier
    /// fronts; nodes inside a front are sorted. Dependencies on
    /// identifiers that are not nodes of this graph are ignored.
    ///
    /// Returns `CyclicDependency` if the graph contains a cycle.
    pub fn fronts(&self) -> Result<Vec<Vec<String>>> {
        if let Some(cycle) = self.find_cycle() {
            return Err(J3nError::CyclicDependency {
                cycle: cycle.join(" -> "),
            });
        }

        let mut remaining: BTreeMap<&str, BTreeSet<&str>> = self
            .nodes
            .iter()
            .map(|(node, deps)| {
                let deps = deps
                    .iter()
                    .map(String::as_str)
                    .filter(|d| self.nodes.contains_key(*d))
                    .collect();
                (node.as_str(), deps)
            })
            .collect();

        let mut fronts = Vec::new();

        while !remaining.is_empty() {
            let front: Vec<&str> = remaining
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(node, _)| *node)
                .collect();

            if front.is_empty() {
                let stuck: Vec<&str> = remaining.keys().copied().collect();
                return Err(J3nError::CyclicDependency {
                    cycle: stuck.join(" -> "),
                });
            }

            for node in &front {
                remaining.remove(node);
            }
            for deps in remaining.values_mut() {
                for node in &front {
                    deps.remove(node);
                }
            }

            fronts.push(front.into_iter().map(str::to_string).collect());
        }

        Ok(fronts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (node, deps) in edges {
            graph.add_node(*node);
            for dep in *deps {
                graph.add_edge(*node, *dep);
            }
        }
        graph
    }

    fn front_index(fronts: &[Vec<String>], node: &str) -> usize {
        fronts
            .iter()
            .position(|f| f.iter().any(|n| n == node))
            .unwrap()
    }

    #[test]
    fn new_graph_is_empty() {
        let graph = DependencyGraph::new();
        assert!(graph.is_empty());
        assert!(graph.fronts().unwrap().is_empty());
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut graph = DependencyGraph::new();
        graph.add_node("a");
        graph.add_edge("a", "b");
        graph.add_node("a");

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.dependencies_of("a"), ["b".to_string()]);
    }

    #[test]
    fn add_edge_creates_from_but_not_to() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");

        assert!(graph.contains("a"));
        assert!(!graph.contains("b"));
    }

    #[test]
    fn simple_cycle_detected() {
        let graph = graph(&[("a", &["b"]), ("b", &["a"])]);
        assert!(graph.is_cyclic());

        let path = graph.find_cycle().unwrap();
        assert!(path.len() >= 2);
        assert_eq!(path.first(), path.last());
    }

    #[test]
    fn self_cycle_detected() {
        let graph = graph(&[("a", &["a"])]);
        assert!(graph.is_cyclic());
    }

    #[test]
    fn disconnected_cycle_detected() {
        let graph = graph(&[
            ("a", &[]),
            ("b", &["a"]),
            ("x", &["y"]),
            ("y", &["z"]),
            ("z", &["x"]),
        ]);

        let path = graph.find_cycle().unwrap();
        assert!(path.contains(&"x".to_string()));
        assert!(path.contains(&"z".to_string()));
    }

    #[test]
    fn diamond_is_not_cyclic() {
        let graph = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])]);
        assert!(!graph.is_cyclic());
    }

    #[test]
    fn fronts_diamond() {
        let graph = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])]);

        let fronts = graph.fronts().unwrap();
        assert_eq!(fronts, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn fronts_independent_nodes_share_one_front() {
        let graph = graph(&[("a", &[]), ("b", &[]), ("c", &[])]);

        let fronts = graph.fronts().unwrap();
        assert_eq!(fronts.len(), 1);
        assert_eq!(fronts[0].len(), 3);
    }

    #[test]
    fn fronts_partition_nodes_and_respect_edges() {
        let edges: &[(&str, &[&str])] = &[
            ("lint", &[]),
            ("compile", &[]),
            ("test", &["compile"]),
            ("package", &["compile", "lint"]),
            ("publish", &["package", "test"]),
            ("docs", &["compile"]),
        ];
        let graph = graph(edges);
        let fronts = graph.fronts().unwrap();

        let mut seen: Vec<String> = fronts.iter().flatten().cloned().collect();
        seen.sort();
        let mut all: Vec<String> = graph.nodes().map(str::to_string).collect();
        all.sort();
        assert_eq!(seen, all);

        for (from, deps) in edges {
            for to in *deps {
                assert!(front_index(&fronts, to) < front_index(&fronts, from));
            }
        }
    }

    #[test]
    fn fronts_reject_cycles() {
        let graph = graph(&[("a", &["b"]), ("b", &["a"])]);
        assert!(matches!(
            graph.fronts(),
            Err(J3nError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn fronts_ignore_dangling_targets() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "missing");

        assert_eq!(graph.fronts().unwrap(), vec![vec!["a"]]);
    }

    #[test]
    fn fronts_can_be_computed_repeatedly() {
        let graph = graph(&[("a", &[]), ("b", &["a"])]);
        assert_eq!(graph.fronts().unwrap(), graph.fronts().unwrap());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn add_reachable_slices_subgraph() {
        let full = graph(&[
            ("build", &[]),
            ("test", &["build"]),
            ("deploy", &["test"]),
            ("docs", &[]),
        ]);

        let mut slice = DependencyGraph::new();
        slice.add_reachable(&full, "deploy");

        assert!(slice.contains("deploy"));
        assert!(slice.contains("test"));
        assert!(slice.contains("build"));
        assert!(!slice.contains("docs"));
        assert_eq!(slice.dependencies_of("deploy"), ["test".to_string()]);
    }

    #[test]
    fn add_reachable_terminates_on_cycles() {
        let full = graph(&[("a", &["b"]), ("b", &["a"])]);

        let mut slice = DependencyGraph::new();
        slice.add_reachable(&full, "a");

        assert_eq!(slice.len(), 2);
        assert!(slice.is_cyclic());
    }
}
