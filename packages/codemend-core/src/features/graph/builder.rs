//! Dependency graph construction
//!
//! Parses every unit in the index, extracts imports, resolves them against
//! the indexed module identifiers, and builds the DependencyGraph. Units
//! that fail to parse stay in the graph as isolated nodes and yield a
//! parse-error finding.

use std::collections::BTreeMap;

use super::dep_graph::{DependencyGraph, UnitImports};
use super::import_extractor::extract_imports;
use crate::features::indexing::SourceIndex;
use crate::features::parsing::{Parser, TreeSitterParser};
use crate::shared::models::{rules, Finding, Result, Severity, Span};

/// Builds the module dependency graph for an index
pub struct DependencyGraphBuilder {
    parser: Box<dyn Parser>,
}

impl DependencyGraphBuilder {
    pub fn new() -> Self {
        Self {
            parser: Box::new(TreeSitterParser::python()),
        }
    }

    pub fn with_parser(parser: Box<dyn Parser>) -> Self {
        Self { parser }
    }

    /// Build the graph over every unit in `index`.
    ///
    /// Returns the graph plus parse-error findings for units whose trees
    /// could not be produced or contain syntax errors. Such units remain
    /// isolated nodes so downstream stages still see them.
    pub fn build(&self, index: &mut SourceIndex) -> Result<(DependencyGraph, Vec<Finding>)> {
        let module_map = build_module_map(index);

        let mut unit_imports: BTreeMap<String, UnitImports> = BTreeMap::new();
        let mut findings = Vec::new();

        let paths = index.paths();
        for path in &paths {
            let Some(unit) = index.get_mut(path) else {
                continue;
            };

            let tree = match unit.tree(self.parser.as_ref()) {
                Ok(tree) => tree,
                Err(e) => {
                    findings.push(Finding::new(
                        path,
                        rules::PARSE_ERROR,
                        Severity::High,
                        Span::zero(),
                        format!("unit could not be parsed: {}", e),
                    ));
                    unit_imports.insert(path.clone(), UnitImports::default());
                    continue;
                }
            };

            // A tree with syntax errors is a parse failure here: the unit
            // stays an isolated node and contributes no edges.
            if tree.has_errors {
                let (span, detail) = tree
                    .errors
                    .first()
                    .map(|e| (e.span, e.message.clone()))
                    .unwrap_or((Span::zero(), "syntax error".to_string()));
                findings.push(Finding::new(
                    path,
                    rules::PARSE_ERROR,
                    Severity::High,
                    span,
                    detail,
                ));
                unit_imports.insert(path.clone(), UnitImports::default());
                continue;
            }

            let mut imports = UnitImports::default();
            for raw in extract_imports(tree) {
                // Try full dotted path first, then the root segment
                let resolved = module_map
                    .get(&raw.module)
                    .or_else(|| module_map.get(raw.root()));

                match resolved {
                    Some(target) if target != path => imports.resolved.push(target.clone()),
                    Some(_) => {} // self-import
                    None => imports.external.push(raw.module.clone()),
                }
            }
            unit_imports.insert(path.clone(), imports);
        }

        let graph = DependencyGraph::build(&unit_imports);
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            cycles = graph.cycles().len(),
            "dependency graph built"
        );
        Ok((graph, findings))
    }
}

impl Default for DependencyGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Module identifier → unit path.
///
/// Each unit is addressable by its file stem and by its dotted relative
/// path (`pkg/util.py` → `pkg.util`); `pkg/__init__.py` maps to `pkg`.
/// Collisions resolve first-wins in path order.
fn build_module_map(index: &SourceIndex) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();

    for path in index.paths() {
        let without_ext = path.strip_suffix(".py").unwrap_or(&path);

        let dotted = if let Some(pkg) = without_ext.strip_suffix("/__init__") {
            pkg.replace('/', ".")
        } else {
            without_ext.replace('/', ".")
        };
        if !dotted.is_empty() {
            map.entry(dotted.clone()).or_insert_with(|| path.clone());
        }

        let stem = dotted.rsplit('.').next().unwrap_or(&dotted);
        if !stem.is_empty() {
            map.entry(stem.to_string()).or_insert_with(|| path.clone());
        }
    }

    map
}
