//! Module dependency graph
//!
//! Directed graph over unit paths using petgraph. Supports Tarjan SCC for
//! cycle detection and Kahn topological order (dependencies first) used to
//! order cross-unit patch batches.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

/// Imports of one unit after resolution against the index
#[derive(Debug, Clone, Default)]
pub struct UnitImports {
    /// Unit paths this unit depends on
    pub resolved: Vec<String>,

    /// Imported names that did not resolve to any indexed unit
    pub external: Vec<String>,
}

/// Graph statistics for the run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub external_count: usize,
    pub cycle_count: usize,
}

/// Module dependency graph
///
/// Nodes are unit paths; an edge A → B means A depends on B. Self-imports
/// are ignored and duplicate edges are collapsed.
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    path_to_node: HashMap<String, NodeIndex>,

    /// Unresolved (external) references per unit, duplicate-free
    externals: BTreeMap<String, BTreeSet<String>>,

    /// Strongly connected components with more than one member
    cycles: Vec<Vec<String>>,

    /// Cached topological order (dependencies first)
    topo_order: Vec<String>,
}

impl DependencyGraph {
    /// Create empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            path_to_node: HashMap::new(),
            externals: BTreeMap::new(),
            cycles: Vec::new(),
            topo_order: Vec::new(),
        }
    }

    /// Build from per-unit resolved imports.
    ///
    /// Input iteration is sorted (BTreeMap), so identical input yields an
    /// identical graph: same node order, same edge order, same topo order.
    pub fn build(unit_imports: &BTreeMap<String, UnitImports>) -> Self {
        let mut graph = DiGraph::new();
        let mut path_to_node = HashMap::new();
        let mut externals: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for path in unit_imports.keys() {
            let idx = graph.add_node(path.clone());
            path_to_node.insert(path.clone(), idx);
        }

        for (from_path, imports) in unit_imports {
            let from_idx = match path_to_node.get(from_path) {
                Some(idx) => *idx,
                None => continue,
            };

            for dep in &imports.resolved {
                // Self-imports never become edges
                if dep == from_path {
                    continue;
                }
                if let Some(&to_idx) = path_to_node.get(dep) {
                    if graph.find_edge(from_idx, to_idx).is_none() {
                        graph.add_edge(from_idx, to_idx, ());
                    }
                }
            }

            for ext in &imports.external {
                externals
                    .entry(from_path.clone())
                    .or_default()
                    .insert(ext.clone());
            }
        }

        let sccs = tarjan_scc(&graph);
        let cycles: Vec<Vec<String>> = sccs
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut members: Vec<String> =
                    scc.into_iter().map(|idx| graph[idx].clone()).collect();
                members.sort();
                members
            })
            .collect();

        let topo_order = Self::compute_topological_order(&graph);

        Self {
            graph,
            path_to_node,
            externals,
            cycles,
            topo_order,
        }
    }

    /// Kahn's algorithm, dependencies-first output. Nodes caught in cycles
    /// are appended afterwards in path order so every unit gets a position.
    fn compute_topological_order(graph: &DiGraph<String, ()>) -> Vec<String> {
        let mut in_degree: HashMap<NodeIndex, usize> = HashMap::new();
        for idx in graph.node_indices() {
            in_degree.insert(idx, 0);
        }
        for edge in graph.edge_references() {
            *in_degree.entry(edge.target()).or_insert(0) += 1;
        }

        let mut roots: Vec<NodeIndex> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&idx, _)| idx)
            .collect();
        roots.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
        let mut queue: VecDeque<NodeIndex> = roots.into();

        let mut order = Vec::new();
        while let Some(idx) = queue.pop_front() {
            order.push(graph[idx].clone());
            for neighbor in graph.neighbors(idx) {
                if let Some(degree) = in_degree.get_mut(&neighbor) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        // Dependencies first (Kahn emits dependents first here)
        order.reverse();

        if order.len() < graph.node_count() {
            let mut leftover: Vec<String> = graph
                .node_indices()
                .map(|idx| graph[idx].clone())
                .filter(|path| !order.contains(path))
                .collect();
            leftover.sort();
            order.extend(leftover);
        }

        order
    }

    /// Units that depend on this unit (direct)
    pub fn get_dependents(&self, path: &str) -> Vec<String> {
        self.neighbors_sorted(path, Direction::Incoming)
    }

    /// Units this unit depends on (direct)
    pub fn get_dependencies(&self, path: &str) -> Vec<String> {
        self.neighbors_sorted(path, Direction::Outgoing)
    }

    fn neighbors_sorted(&self, path: &str, dir: Direction) -> Vec<String> {
        let Some(&idx) = self.path_to_node.get(path) else {
            return Vec::new();
        };
        let mut out: Vec<String> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|idx| self.graph[idx].clone())
            .collect();
        out.sort();
        out
    }

    /// Units that depend on this unit, transitively. Cycle-safe: a visited
    /// set bounds the traversal.
    pub fn get_transitive_dependents(&self, path: &str) -> Vec<String> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();

        if let Some(&idx) = self.path_to_node.get(path) {
            queue.push_back(idx);
        }

        while let Some(idx) = queue.pop_front() {
            for neighbor in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if visited.insert(self.graph[neighbor].clone()) {
                    queue.push_back(neighbor);
                }
            }
        }

        visited.into_iter().collect()
    }

    /// Topological order, dependencies first
    pub fn topological_order(&self) -> &[String] {
        &self.topo_order
    }

    /// Position of a unit in the topological order (for batch ordering)
    pub fn topo_position(&self, path: &str) -> Option<usize> {
        self.topo_order.iter().position(|p| p == path)
    }

    /// External references per unit
    pub fn externals(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.externals
    }

    /// Import cycles (SCCs with more than one member)
    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_node(&self, path: &str) -> bool {
        self.path_to_node.contains_key(path)
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            external_count: self.externals.values().map(|s| s.len()).sum(),
            cycle_count: self.cycles.len(),
        }
    }

    /// Edge list as (from, to) pairs, sorted, for report output and
    /// idempotence checks.
    pub fn edge_list(&self) -> Vec<(String, String)> {
        let mut edges: Vec<(String, String)> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].clone(),
                    self.graph[e.target()].clone(),
                )
            })
            .collect();
        edges.sort();
        edges
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imports(resolved: &[&str], external: &[&str]) -> UnitImports {
        UnitImports {
            resolved: resolved.iter().map(|s| s.to_string()).collect(),
            external: external.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::build(&BTreeMap::new());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.has_cycles());
    }

    #[test]
    fn test_simple_dependency() {
        let mut input = BTreeMap::new();
        input.insert("src/main.py".to_string(), imports(&["src/utils.py"], &[]));
        input.insert("src/utils.py".to_string(), imports(&[], &[]));

        let graph = DependencyGraph::build(&input);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.get_dependencies("src/main.py"),
            vec!["src/utils.py".to_string()]
        );
        assert_eq!(
            graph.get_dependents("src/utils.py"),
            vec!["src/main.py".to_string()]
        );
    }

    #[test]
    fn test_self_import_ignored() {
        let mut input = BTreeMap::new();
        input.insert(
            "recursive.py".to_string(),
            imports(&["recursive.py", "other.py"], &[]),
        );
        input.insert("other.py".to_string(), imports(&[], &[]));

        let graph = DependencyGraph::build(&input);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_duplicate_edges_collapsed() {
        let mut input = BTreeMap::new();
        input.insert("a.py".to_string(), imports(&["b.py", "b.py"], &[]));
        input.insert("b.py".to_string(), imports(&[], &[]));

        let graph = DependencyGraph::build(&input);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_cycle_detection_terminates() {
        let mut input = BTreeMap::new();
        input.insert("a.py".to_string(), imports(&["b.py"], &[]));
        input.insert("b.py".to_string(), imports(&["a.py"], &[]));

        let graph = DependencyGraph::build(&input);

        assert!(graph.has_cycles());
        assert_eq!(graph.cycles().len(), 1);
        assert_eq!(graph.cycles()[0], vec!["a.py", "b.py"]);
        assert_eq!(graph.edge_count(), 2);

        // Traversal through the cycle is bounded
        let dependents = graph.get_transitive_dependents("a.py");
        assert!(dependents.contains(&"b.py".to_string()));
    }

    #[test]
    fn test_topological_order_dependencies_first() {
        let mut input = BTreeMap::new();
        input.insert("a.py".to_string(), imports(&["b.py"], &[]));
        input.insert("b.py".to_string(), imports(&["c.py"], &[]));
        input.insert("c.py".to_string(), imports(&[], &[]));

        let graph = DependencyGraph::build(&input);
        let order = graph.topological_order();

        let pos = |p: &str| order.iter().position(|x| x == p).unwrap();
        assert!(pos("c.py") < pos("b.py"));
        assert!(pos("b.py") < pos("a.py"));
    }

    #[test]
    fn test_topological_order_covers_cycle_members() {
        let mut input = BTreeMap::new();
        input.insert("a.py".to_string(), imports(&["b.py"], &[]));
        input.insert("b.py".to_string(), imports(&["a.py"], &[]));
        input.insert("c.py".to_string(), imports(&[], &[]));

        let graph = DependencyGraph::build(&input);
        assert_eq!(graph.topological_order().len(), 3);
        assert!(graph.topo_position("a.py").is_some());
        assert!(graph.topo_position("b.py").is_some());
    }

    #[test]
    fn test_externals_recorded_not_edges() {
        let mut input = BTreeMap::new();
        input.insert("main.py".to_string(), imports(&[], &["numpy", "os"]));

        let graph = DependencyGraph::build(&input);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        let ext = graph.externals().get("main.py").unwrap();
        assert!(ext.contains("numpy"));
        assert!(ext.contains("os"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let mut input = BTreeMap::new();
        input.insert("a.py".to_string(), imports(&["b.py", "c.py"], &["sys"]));
        input.insert("b.py".to_string(), imports(&["c.py"], &[]));
        input.insert("c.py".to_string(), imports(&[], &[]));

        let g1 = DependencyGraph::build(&input);
        let g2 = DependencyGraph::build(&input);

        assert_eq!(g1.edge_list(), g2.edge_list());
        assert_eq!(g1.topological_order(), g2.topological_order());
        assert_eq!(g1.externals(), g2.externals());
    }
}
