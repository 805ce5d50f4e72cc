//! Oversized function rule
//!
//! Flags functions and lambdas whose statement count or branch count exceeds
//! the configured thresholds. Nested functions are measured independently;
//! a nested def contributes one statement to its parent and nothing else.

use super::rule::DetectionRule;
use crate::config::DetectorConfig;
use crate::features::parsing::{ParsedTree, SyntaxKind, SyntaxNode};
use crate::shared::models::{rules, Finding, Severity};

/// Detects functions exceeding size or branching thresholds
pub struct OversizedFunctionRule {
    max_statements: usize,
    max_branches: usize,
}

impl OversizedFunctionRule {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            max_statements: config.max_function_statements,
            max_branches: config.max_function_branches,
        }
    }
}

impl DetectionRule for OversizedFunctionRule {
    fn rule_id(&self) -> &'static str {
        rules::OVERSIZED_FUNCTION
    }

    fn detect(&self, unit_path: &str, tree: &ParsedTree) -> Vec<Finding> {
        let mut findings = Vec::new();

        for node in tree.root.preorder() {
            if !node.kind.is_function_like() || node.children.is_empty() {
                continue;
            }

            let measure = measure_body(node);
            let mut excess = Vec::new();
            if measure.statements > self.max_statements {
                excess.push(format!(
                    "{} statements (limit {})",
                    measure.statements, self.max_statements
                ));
            }
            if measure.branches > self.max_branches {
                excess.push(format!(
                    "{} branches (limit {})",
                    measure.branches, self.max_branches
                ));
            }
            if excess.is_empty() {
                continue;
            }

            findings.push(Finding::new(
                unit_path,
                rules::OVERSIZED_FUNCTION,
                Severity::Medium,
                node.span,
                format!("function '{}' has {}", function_name(node), excess.join(" and ")),
            ));
        }

        findings
    }
}

struct BodyMeasure {
    statements: usize,
    branches: usize,
}

/// Count statements and branch points in a function body, excluding the
/// bodies of nested functions. Branch count starts at one (the single path
/// through a straight-line body).
fn measure_body(func: &SyntaxNode) -> BodyMeasure {
    let mut measure = BodyMeasure {
        statements: 0,
        branches: 1,
    };
    walk(func, &mut measure);
    measure
}

fn walk(node: &SyntaxNode, measure: &mut BodyMeasure) {
    for child in &node.children {
        let raw = child.raw_kind.as_deref();
        if child.kind.is_statement() || raw.map_or(false, |k| k.ends_with("_statement")) {
            measure.statements += 1;
        }
        if child.kind.is_branch_point() || raw == Some("boolean_operator") {
            measure.branches += 1;
        }
        if !child.kind.is_function_like() {
            walk(child, measure);
        }
    }
}

fn function_name(node: &SyntaxNode) -> &str {
    if node.kind == SyntaxKind::LambdaDef {
        return "<lambda>";
    }
    node.find_child(&SyntaxKind::NameExpr)
        .map(|n| n.text())
        .unwrap_or("<anonymous>")
}
