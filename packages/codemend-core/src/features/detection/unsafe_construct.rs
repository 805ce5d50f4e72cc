//! Unsafe construct rule
//!
//! Flags calls to dynamic-code-execution builtins (`eval`, `exec`). The
//! finding span covers the callee identifier so the planner can replace it
//! in place.

use super::rule::DetectionRule;
use crate::features::parsing::{ParsedTree, SyntaxKind};
use crate::shared::models::{rules, Finding, Severity};

const UNSAFE_CALLEES: &[&str] = &["eval", "exec"];

/// Detects `eval(...)` and `exec(...)` calls
pub struct UnsafeConstructRule;

impl DetectionRule for UnsafeConstructRule {
    fn rule_id(&self) -> &'static str {
        rules::UNSAFE_CONSTRUCT
    }

    fn detect(&self, unit_path: &str, tree: &ParsedTree) -> Vec<Finding> {
        let mut findings = Vec::new();

        for node in tree.root.preorder() {
            if node.kind != SyntaxKind::CallExpr {
                continue;
            }
            // The callee is the call's first child; attribute calls like
            // obj.eval() are a different construct and are not flagged.
            let Some(callee) = node.children.first() else {
                continue;
            };
            if callee.kind != SyntaxKind::NameExpr {
                continue;
            }
            let name = callee.text();
            if UNSAFE_CALLEES.contains(&name) {
                findings.push(Finding::new(
                    unit_path,
                    rules::UNSAFE_CONSTRUCT,
                    Severity::High,
                    callee.span,
                    format!("dynamic code execution via {}()", name),
                ));
            }
        }

        findings
    }
}
