//! Import extraction from parsed Python trees
//!
//! Pulls `import x`, `import x as y` and `from x import ...` statements out
//! of a ParsedTree. Resolution against the index happens in the builder.

use crate::features::parsing::{ParsedTree, SyntaxKind, SyntaxNode};
use crate::shared::models::Span;

/// One import statement occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct RawImport {
    /// Dotted module path with any relative-import dots stripped
    pub module: String,

    /// Alias, for `import x as y`
    pub alias: Option<String>,

    /// Span of the import statement
    pub span: Span,
}

impl RawImport {
    /// Root segment of the dotted module path (`os.path` → `os`)
    pub fn root(&self) -> &str {
        self.module.split('.').next().unwrap_or(&self.module)
    }
}

/// Extract every import occurrence from a tree
pub fn extract_imports(tree: &ParsedTree) -> Vec<RawImport> {
    let mut imports = Vec::new();
    for node in tree.root.preorder() {
        if node.kind != SyntaxKind::ImportDecl {
            continue;
        }
        match node.raw_kind.as_deref() {
            Some("import_statement") => collect_plain_import(node, &mut imports),
            Some("import_from_statement") => collect_from_import(node, &mut imports),
            _ => {}
        }
    }
    imports
}

/// `import a.b, c as d`
fn collect_plain_import(node: &SyntaxNode, out: &mut Vec<RawImport>) {
    for child in &node.children {
        match child.raw_kind.as_deref() {
            Some("dotted_name") => out.push(RawImport {
                module: child.flat_text(),
                alias: None,
                span: node.span,
            }),
            Some("aliased_import") => {
                let module = child
                    .children_with_raw_kind("dotted_name")
                    .first()
                    .map(|n| n.flat_text())
                    .unwrap_or_default();
                let alias = child
                    .children
                    .iter()
                    .rev()
                    .find(|c| c.kind == SyntaxKind::NameExpr)
                    .map(|n| n.text().to_string());
                if !module.is_empty() {
                    out.push(RawImport {
                        module,
                        alias,
                        span: node.span,
                    });
                }
            }
            _ => {}
        }
    }
}

/// `from a.b import c` / `from . import c`
fn collect_from_import(node: &SyntaxNode, out: &mut Vec<RawImport>) {
    let mut module_node: Option<&SyntaxNode> = None;
    let mut name_nodes: Vec<&SyntaxNode> = Vec::new();

    for child in &node.children {
        match child.raw_kind.as_deref() {
            Some("relative_import") => {
                if module_node.is_none() {
                    module_node = Some(child);
                }
            }
            Some("dotted_name") => {
                if module_node.is_none() {
                    module_node = Some(child);
                } else {
                    name_nodes.push(child);
                }
            }
            Some("aliased_import") => name_nodes.push(child),
            _ => {}
        }
    }

    let module_text = module_node.map(|n| n.flat_text()).unwrap_or_default();
    let trimmed = module_text.trim_start_matches('.');

    if !trimmed.is_empty() {
        out.push(RawImport {
            module: trimmed.to_string(),
            alias: None,
            span: node.span,
        });
        return;
    }

    // `from . import util` - the imported names are sibling modules
    for name in name_nodes {
        let module = match name.raw_kind.as_deref() {
            Some("aliased_import") => name
                .children_with_raw_kind("dotted_name")
                .first()
                .map(|n| n.flat_text())
                .unwrap_or_default(),
            _ => name.flat_text(),
        };
        if !module.is_empty() {
            out.push(RawImport {
                module,
                alias: None,
                span: node.span,
            });
        }
    }
}
