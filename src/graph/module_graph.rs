//! Module dependency graph implementation using petgraph.
//!
//! Nodes are project files (or, optionally, external packages); edges are
//! individual import statements, so parallel edges between the same pair of
//! files are legal. Cycle detection is an iterative depth-first traversal
//! with an explicit recursion stack, suitable for graphs too deep for call
//! stack recursion.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeRef, NodeIndexable};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Represents a node in the module graph.
///
/// Each node is one project file, identified by its root-relative path, or
/// an external package when the builder was asked to include them.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// Node identity: root-relative path, or the package specifier for
    /// external nodes.
    pub id: String,
    /// Names exported by this file (empty for external nodes).
    pub exports: Vec<String>,
    /// True for nodes representing packages outside the project.
    pub external: bool,
}

impl FileNode {
    /// Creates a node for a project file.
    pub fn project(path: impl Into<String>, exports: Vec<String>) -> Self {
        Self {
            id: path.into(),
            exports,
            external: false,
        }
    }

    /// Creates a node for an external package specifier.
    pub fn external(specifier: impl Into<String>) -> Self {
        Self {
            id: specifier.into(),
            exports: Vec::new(),
            external: true,
        }
    }
}

/// Represents an edge in the module graph: one import statement.
#[derive(Debug, Clone)]
pub struct ImportEdge {
    /// Names the importing file pulls out of the target (`*` for namespace
    /// or whole-module imports; empty for side-effect imports).
    pub imports: Vec<String>,
    /// 1-based line of the import statement.
    pub line: usize,
}

impl ImportEdge {
    /// Creates a new import edge.
    pub fn new(imports: Vec<String>, line: usize) -> Self {
        Self { imports, line }
    }
}

/// Per-node traversal state for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// A directed graph of file-to-file import relationships.
///
/// Uses petgraph's `DiGraph` internally with a path-to-index side map for
/// O(1) lookup. Edges point from the importing file to its target.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    graph: DiGraph<FileNode, ImportEdge>,
    node_indices: HashMap<String, NodeIndex>,
}

impl ModuleGraph {
    /// Creates a new empty module graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
        }
    }

    /// Adds a node to the graph.
    ///
    /// If a node with the same id already exists, returns its existing
    /// index without modification.
    pub fn add_node(&mut self, node: FileNode) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&node.id) {
            return idx;
        }

        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(id, idx);
        idx
    }

    /// Adds an import edge between two existing nodes.
    ///
    /// Returns `true` if the edge was added, `false` if either node does
    /// not exist. Parallel edges between the same pair are legal: each
    /// import statement is its own edge.
    pub fn add_edge(&mut self, from: &str, to: &str, edge: ImportEdge) -> bool {
        let from_idx = match self.node_indices.get(from) {
            Some(&idx) => idx,
            None => return false,
        };
        let to_idx = match self.node_indices.get(to) {
            Some(&idx) => idx,
            None => return false,
        };

        self.graph.add_edge(from_idx, to_idx, edge);
        true
    }

    /// Gets a reference to a node by id.
    pub fn get_node(&self, id: &str) -> Option<&FileNode> {
        self.node_indices
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Checks if a node exists in the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &FileNode> {
        self.graph.node_weights()
    }

    /// All edges as (from, to, edge) triples in insertion order.
    pub fn edges(&self) -> Vec<(&FileNode, &FileNode, &ImportEdge)> {
        self.graph
            .edge_references()
            .filter_map(|edge| {
                let from = self.graph.node_weight(edge.source())?;
                let to = self.graph.node_weight(edge.target())?;
                Some((from, to, edge.weight()))
            })
            .collect()
    }

    /// Ids of files the given file imports (outgoing edges).
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|edge| self.graph.node_weight(edge.target()))
            .map(|node| node.id.as_str())
            .collect()
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks if the graph contains at least one import cycle.
    pub fn has_cycles(&self) -> bool {
        !self.detect_cycles().is_empty()
    }

    /// Detects import cycles.
    ///
    /// Runs an iterative DFS with an explicit stack and a per-node
    /// {unvisited, in-progress, done} state. A back edge to an in-progress
    /// node records the slice of the current path from that node's most
    /// recent occurrence to the current node, with the target appended, so
    /// a self-import yields `[A, A]` and `a -> b -> a` yields
    /// `[a, b, a]`.
    ///
    /// Every reported cycle is canonicalized by rotating the smallest id to
    /// the front, and the cycle list is sorted, so output does not depend
    /// on traversal order.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut state = vec![VisitState::Unvisited; self.graph.node_bound()];
        let mut cycles: Vec<Vec<String>> = Vec::new();
        let mut seen: HashSet<Vec<String>> = HashSet::new();

        let mut roots: Vec<NodeIndex> = self.graph.node_indices().collect();
        roots.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));

        for root in roots {
            if state[root.index()] != VisitState::Unvisited {
                continue;
            }

            let mut path: Vec<NodeIndex> = vec![root];
            let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
                vec![(root, self.sorted_neighbors(root), 0)];
            state[root.index()] = VisitState::InProgress;

            while let Some(frame) = stack.last_mut() {
                if frame.2 < frame.1.len() {
                    let next = frame.1[frame.2];
                    frame.2 += 1;

                    match state[next.index()] {
                        VisitState::Unvisited => {
                            state[next.index()] = VisitState::InProgress;
                            path.push(next);
                            stack.push((next, self.sorted_neighbors(next), 0));
                        }
                        VisitState::InProgress => {
                            let pos = path
                                .iter()
                                .rposition(|&n| n == next)
                                .expect("in-progress node must be on the current path");
                            let mut cycle: Vec<String> = path[pos..]
                                .iter()
                                .map(|&n| self.graph[n].id.clone())
                                .collect();
                            cycle.push(self.graph[next].id.clone());
                            let canonical = canonicalize_cycle(cycle);
                            if seen.insert(canonical.clone()) {
                                cycles.push(canonical);
                            }
                        }
                        VisitState::Done => {}
                    }
                } else if let Some((node, _, _)) = stack.pop() {
                    state[node.index()] = VisitState::Done;
                    path.pop();
                }
            }
        }

        cycles.sort();
        cycles
    }

    /// Outgoing neighbors in id order (deduplicated: parallel edges visit
    /// the target once per traversal).
    fn sorted_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        neighbors.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
        neighbors.dedup();
        neighbors
    }
}

/// Rotates a closed cycle (`[a, b, c, a]`) so the lexicographically
/// smallest id leads, keeping the closing duplicate.
fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    cycle.pop();

    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(pos, _)| pos)
        .unwrap_or(0);
    cycle.rotate_left(min_pos);

    let first = cycle[0].clone();
    cycle.push(first);
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> FileNode {
        FileNode::project(id, Vec::new())
    }

    fn edge() -> ImportEdge {
        ImportEdge::new(Vec::new(), 1)
    }

    #[test]
    fn test_create_empty_graph() {
        let graph = ModuleGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_add_node_deduplicates() {
        let mut graph = ModuleGraph::new();
        let idx = graph.add_node(node("a.ts"));
        let idx2 = graph.add_node(node("a.ts"));

        assert_eq!(idx, idx2);
        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains("a.ts"));
    }

    #[test]
    fn test_add_edge_requires_nodes() {
        let mut graph = ModuleGraph::new();
        graph.add_node(node("a.ts"));
        graph.add_node(node("b.ts"));

        assert!(graph.add_edge("a.ts", "b.ts", edge()));
        assert!(!graph.add_edge("a.ts", "ghost.ts", edge()));
        assert!(!graph.add_edge("ghost.ts", "b.ts", edge()));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_parallel_edges_are_legal() {
        let mut graph = ModuleGraph::new();
        graph.add_node(node("a.ts"));
        graph.add_node(node("b.ts"));

        graph.add_edge("a.ts", "b.ts", ImportEdge::new(vec!["x".into()], 1));
        graph.add_edge("a.ts", "b.ts", ImportEdge::new(vec!["y".into()], 2));

        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_dependencies_of() {
        let mut graph = ModuleGraph::new();
        graph.add_node(node("a.ts"));
        graph.add_node(node("b.ts"));
        graph.add_node(node("c.ts"));
        graph.add_edge("a.ts", "b.ts", edge());
        graph.add_edge("a.ts", "c.ts", edge());

        let mut deps = graph.dependencies_of("a.ts");
        deps.sort();
        assert_eq!(deps, vec!["b.ts", "c.ts"]);
        assert!(graph.dependencies_of("ghost.ts").is_empty());
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let mut graph = ModuleGraph::new();
        graph.add_node(node("a.ts"));
        graph.add_node(node("b.ts"));
        graph.add_node(node("c.ts"));
        graph.add_edge("a.ts", "b.ts", edge());
        graph.add_edge("b.ts", "c.ts", edge());

        assert!(!graph.has_cycles());
        assert!(graph.detect_cycles().is_empty());
    }

    #[test]
    fn test_three_node_cycle_is_a_rotation() {
        let mut graph = ModuleGraph::new();
        graph.add_node(node("b.ts"));
        graph.add_node(node("c.ts"));
        graph.add_node(node("a.ts"));
        graph.add_edge("a.ts", "b.ts", edge());
        graph.add_edge("b.ts", "c.ts", edge());
        graph.add_edge("c.ts", "a.ts", edge());

        let cycles = graph.detect_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["a.ts", "b.ts", "c.ts", "a.ts"]);
    }

    #[test]
    fn test_self_import_cycle() {
        let mut graph = ModuleGraph::new();
        graph.add_node(node("a.ts"));
        graph.add_edge("a.ts", "a.ts", edge());

        let cycles = graph.detect_cycles();
        assert_eq!(cycles, vec![vec!["a.ts".to_string(), "a.ts".to_string()]]);
    }

    #[test]
    fn test_two_node_cycle() {
        let mut graph = ModuleGraph::new();
        graph.add_node(node("a.ts"));
        graph.add_node(node("b.ts"));
        graph.add_edge("a.ts", "b.ts", edge());
        graph.add_edge("b.ts", "a.ts", edge());

        let cycles = graph.detect_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(
            cycles[0],
            vec!["a.ts".to_string(), "b.ts".to_string(), "a.ts".to_string()]
        );
    }

    #[test]
    fn test_disjoint_cycles_both_reported() {
        let mut graph = ModuleGraph::new();
        for id in ["a.ts", "b.ts", "c.ts", "d.ts", "e.ts"] {
            graph.add_node(node(id));
        }
        graph.add_edge("a.ts", "b.ts", edge());
        graph.add_edge("b.ts", "a.ts", edge());
        graph.add_edge("c.ts", "d.ts", edge());
        graph.add_edge("d.ts", "e.ts", edge());
        graph.add_edge("e.ts", "c.ts", edge());

        let cycles = graph.detect_cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0][0], "a.ts");
        assert_eq!(cycles[1][0], "c.ts");
    }

    #[test]
    fn test_cycle_output_independent_of_insertion_order() {
        let build = |ids: &[&str]| {
            let mut graph = ModuleGraph::new();
            for id in ids {
                graph.add_node(node(id));
            }
            graph.add_edge("x.ts", "y.ts", edge());
            graph.add_edge("y.ts", "z.ts", edge());
            graph.add_edge("z.ts", "x.ts", edge());
            graph.detect_cycles()
        };

        let forward = build(&["x.ts", "y.ts", "z.ts"]);
        let reversed = build(&["z.ts", "y.ts", "x.ts"]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_external_node_in_graph() {
        let mut graph = ModuleGraph::new();
        graph.add_node(node("a.ts"));
        graph.add_node(FileNode::external("react"));
        graph.add_edge("a.ts", "react", ImportEdge::new(vec!["default".into()], 1));

        assert_eq!(graph.node_count(), 2);
        assert!(graph.get_node("react").unwrap().external);
        assert!(!graph.has_cycles());
    }
}
