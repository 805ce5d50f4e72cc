//! Issue detector registry
//!
//! Runs every registered DetectionRule over every parseable unit in the
//! index. Detection is read-only; units that cannot be parsed are skipped
//! here because graph building already surfaced their parse-error findings.

use super::oversized_function::OversizedFunctionRule;
use super::rule::DetectionRule;
use super::unsafe_construct::UnsafeConstructRule;
use crate::config::DetectorConfig;
use crate::features::indexing::SourceIndex;
use crate::features::parsing::{Parser, TreeSitterParser};
use crate::shared::models::Finding;

/// Rule registry plus the parser used to obtain trees
pub struct IssueDetector {
    parser: Box<dyn Parser>,
    rules: Vec<Box<dyn DetectionRule>>,
}

impl IssueDetector {
    /// Detector with the built-in rule set
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            parser: Box::new(TreeSitterParser::python()),
            rules: vec![
                Box::new(UnsafeConstructRule),
                Box::new(OversizedFunctionRule::new(config)),
            ],
        }
    }

    /// Detector with no rules registered
    pub fn empty() -> Self {
        Self {
            parser: Box::new(TreeSitterParser::python()),
            rules: Vec::new(),
        }
    }

    /// Register an additional rule
    pub fn with_rule(mut self, rule: Box<dyn DetectionRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.rule_id()).collect()
    }

    /// Run all rules over all units. Output order is deterministic: unit
    /// path, then span start, then rule id.
    pub fn detect(&self, index: &mut SourceIndex) -> Vec<Finding> {
        let mut findings = Vec::new();

        let paths = index.paths();
        for path in &paths {
            let Some(unit) = index.get_mut(path) else {
                continue;
            };
            let tree = match unit.tree(self.parser.as_ref()) {
                Ok(tree) => tree,
                Err(e) => {
                    tracing::debug!("detect: skipping unparseable unit {}: {}", path, e);
                    continue;
                }
            };
            if tree.has_errors {
                continue;
            }

            for rule in &self.rules {
                findings.extend(rule.detect(path, tree));
            }
        }

        findings.sort_by(|a, b| {
            (&a.unit_path, a.span.start_byte, &a.rule_id)
                .cmp(&(&b.unit_path, b.span.start_byte, &b.rule_id))
        });

        tracing::info!(findings = findings.len(), "detection complete");
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::rules;

    fn index_of(files: &[(&str, &str)]) -> SourceIndex {
        let mut index = SourceIndex::new();
        for (path, text) in files {
            index.insert_unit(path.to_string(), text.to_string());
        }
        index
    }

    #[test]
    fn test_detect_runs_all_rules() {
        let mut src = String::from("def big(flag):\n");
        for i in 0..8 {
            src.push_str(&format!("    v{} = {}\n", i, i));
        }
        src.push_str("    return eval(flag)\n");

        let config = DetectorConfig {
            max_function_statements: 5,
            max_function_branches: 10,
        };
        let mut index = index_of(&[("app.py", &src)]);
        let findings = IssueDetector::new(&config).detect(&mut index);

        // One oversized-function and one unsafe-construct finding for the
        // same function; both are kept as independent findings.
        let ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert!(ids.contains(&rules::OVERSIZED_FUNCTION));
        assert!(ids.contains(&rules::UNSAFE_CONSTRUCT));
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_detect_does_not_mutate_units() {
        let source = "x = eval(\"1\")\n";
        let mut index = index_of(&[("m.py", source)]);

        IssueDetector::new(&DetectorConfig::default()).detect(&mut index);

        assert_eq!(index.get("m.py").unwrap().text(), source);
    }

    #[test]
    fn test_detect_output_order_is_deterministic() {
        let mut index = index_of(&[
            ("b.py", "exec(\"a\")\neval(\"b\")\n"),
            ("a.py", "eval(\"c\")\n"),
        ]);

        let findings = IssueDetector::new(&DetectorConfig::default()).detect(&mut index);

        let paths: Vec<&str> = findings.iter().map(|f| f.unit_path.as_str()).collect();
        assert_eq!(paths, vec!["a.py", "b.py", "b.py"]);
        assert!(findings[1].span.start_byte < findings[2].span.start_byte);
    }

    #[test]
    fn test_unparseable_unit_skipped() {
        let mut index = index_of(&[("bad.py", "def broken(:\n")]);
        let findings = IssueDetector::new(&DetectorConfig::default()).detect(&mut index);
        assert!(findings.is_empty());
    }
}
