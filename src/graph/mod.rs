//! Graph module for file-to-file dependency modeling.
//!
//! Provides the [`ModuleGraph`] struct for building and analyzing module
//! import relationships using a directed graph structure.
//!
//! # Example
//!
//! ```rust
//! use refscan::graph::{FileNode, ImportEdge, ModuleGraph};
//!
//! let mut graph = ModuleGraph::new();
//! graph.add_node(FileNode::project("src/a.ts", vec!["run".into()]));
//! graph.add_node(FileNode::project("src/b.ts", vec![]));
//! graph.add_edge("src/a.ts", "src/b.ts", ImportEdge::new(vec!["helper".into()], 1));
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod module_graph;

pub use module_graph::{FileNode, ImportEdge, ModuleGraph};
