//! Detection rule trait

use crate::features::parsing::ParsedTree;
use crate::shared::models::Finding;

/// A static-analysis rule over one parsed unit.
///
/// Rules are read-only: they inspect the tree and return findings, never
/// mutating the tree or the unit text. A rule must return a finite set of
/// findings for any input.
pub trait DetectionRule: Send + Sync {
    /// Stable rule identifier used in findings and remediation policy
    fn rule_id(&self) -> &'static str;

    /// Run the rule over one unit's tree
    fn detect(&self, unit_path: &str, tree: &ParsedTree) -> Vec<Finding>;
}
