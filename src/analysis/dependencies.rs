//! Dependency graph analysis and the orphan-import companion check.
//!
//! Builds a [`ModuleGraph`] from the index's import facts, restricts it to
//! the entry-file reachable subset when asked, and reports nodes, edges,
//! and circular dependencies. Unresolved package specifiers are silently
//! dropped (or materialized as external nodes on request); unresolved
//! *relative* specifiers are broken imports, reported by
//! [`find_orphans`] rather than fabricated as edges.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::graph::{FileNode, ImportEdge, ModuleGraph};
use crate::index::{resolve, FileId, ProjectIndex};

/// Options for dependency graph construction.
#[derive(Debug, Clone, Default)]
pub struct GraphOptions {
    /// Restrict the graph to files reachable from these root-relative
    /// paths. Empty means the whole project.
    pub entry_files: Vec<String>,
    /// Maximum resolution hops from the entry files. Ignored without
    /// entry files.
    pub depth: Option<usize>,
    /// Materialize external package specifiers as nodes and edges.
    pub include_external: bool,
}

/// A node in the serialized graph report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub path: String,
    pub exports: Vec<String>,
}

/// An edge in the serialized graph report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub imports: Vec<String>,
}

/// Aggregate graph statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_files: usize,
    pub total_exports: usize,
    pub total_imports: usize,
    pub circular_deps: Vec<Vec<String>>,
}

/// Full dependency graph report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraphReport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub stats: GraphStats,
}

/// A relative import specifier that resolves to no project file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanImport {
    pub file: String,
    pub specifier: String,
    pub line: usize,
}

/// Orphan check statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanStats {
    pub total_imports: usize,
    pub orphan_count: usize,
}

/// Orphan-import companion report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanReport {
    pub orphans: Vec<OrphanImport>,
    pub stats: OrphanStats,
}

/// Builds the module graph for the selected file set.
pub fn build_module_graph(index: &ProjectIndex, options: &GraphOptions) -> ModuleGraph {
    let selected = select_files(index, options);

    // Insertion order drives report order; ids ascend in sorted path order.
    let mut ids: Vec<FileId> = selected.iter().copied().collect();
    ids.sort_unstable();

    let mut graph = ModuleGraph::with_capacity(ids.len(), ids.len() * 2);

    for &id in &ids {
        let file = index.file(id);
        let exports: Vec<String> = file.exports.iter().map(|e| e.name.clone()).collect();
        graph.add_node(FileNode::project(file.path.clone(), exports));
    }

    for &id in &ids {
        let file = index.file(id);
        for import in &file.imports {
            match resolve::resolve(index, &file.path, &import.source) {
                Some(target) if selected.contains(&target) => {
                    let target_path = index.file(target).path.clone();
                    graph.add_edge(
                        &file.path,
                        &target_path,
                        ImportEdge::new(import.edge_names(), import.line),
                    );
                }
                Some(_) => {} // resolved outside the entry-restricted subset
                None if options.include_external && import.is_package_import() => {
                    graph.add_node(FileNode::external(import.source.clone()));
                    graph.add_edge(
                        &file.path,
                        &import.source,
                        ImportEdge::new(import.edge_names(), import.line),
                    );
                }
                None => {} // unresolved: dropped here, surfaced by the orphan check
            }
        }
    }

    graph
}

/// Runs the dependency graph analysis.
pub fn analyze(index: &ProjectIndex, options: &GraphOptions) -> DependencyGraphReport {
    let graph = build_module_graph(index, options);

    let nodes: Vec<GraphNode> = graph
        .nodes()
        .map(|node| GraphNode {
            id: node.id.clone(),
            path: node.id.clone(),
            exports: node.exports.clone(),
        })
        .collect();

    let edges: Vec<GraphEdge> = graph
        .edges()
        .into_iter()
        .map(|(from, to, edge)| GraphEdge {
            from: from.id.clone(),
            to: to.id.clone(),
            imports: edge.imports.clone(),
        })
        .collect();

    let total_files = graph.nodes().filter(|n| !n.external).count();
    let total_exports = graph
        .nodes()
        .filter(|n| !n.external)
        .map(|n| n.exports.len())
        .sum();
    let total_imports = edges.iter().map(|e| e.imports.len()).sum();

    DependencyGraphReport {
        nodes,
        edges,
        stats: GraphStats {
            total_files,
            total_exports,
            total_imports,
            circular_deps: graph.detect_cycles(),
        },
    }
}

/// Reports relative import specifiers that resolve to no project file.
pub fn find_orphans(index: &ProjectIndex) -> OrphanReport {
    let mut orphans = Vec::new();
    let mut total_imports = 0;

    for file in index.files() {
        for import in &file.imports {
            total_imports += 1;
            if resolve::is_relative(&import.source)
                && resolve::resolve(index, &file.path, &import.source).is_none()
            {
                orphans.push(OrphanImport {
                    file: file.path.clone(),
                    specifier: import.source.clone(),
                    line: import.line,
                });
            }
        }
    }

    let orphan_count = orphans.len();
    OrphanReport {
        orphans,
        stats: OrphanStats {
            total_imports,
            orphan_count,
        },
    }
}

/// Picks the analyzed file set: everything, or a breadth-first reachable
/// subset from the entry files bounded by `depth`.
fn select_files(index: &ProjectIndex, options: &GraphOptions) -> HashSet<FileId> {
    if options.entry_files.is_empty() {
        return index.files().iter().map(|f| f.id).collect();
    }

    let mut selected = HashSet::new();
    let mut queue: VecDeque<(FileId, usize)> = VecDeque::new();

    for entry in &options.entry_files {
        if let Some(id) = index.lookup(entry) {
            if selected.insert(id) {
                queue.push_back((id, 0));
            }
        } else {
            tracing::warn!("entry file not found in project: {}", entry);
        }
    }

    while let Some((id, hop)) = queue.pop_front() {
        if let Some(limit) = options.depth {
            if hop >= limit {
                continue;
            }
        }
        let file = index.file(id);
        for import in &file.imports {
            if let Some(target) = resolve::resolve(index, &file.path, &import.source) {
                if selected.insert(target) {
                    queue.push_back((target, hop + 1));
                }
            }
        }
    }

    selected
}
