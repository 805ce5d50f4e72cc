//! Dependency graph: import extraction, graph model, and graph builder

pub mod builder;
pub mod dep_graph;
pub mod import_extractor;

pub use builder::DependencyGraphBuilder;
pub use dep_graph::{DependencyGraph, GraphStats, UnitImports};
pub use import_extractor::{extract_imports, RawImport};
