//! Fix planner
//!
//! Turns findings into a PatchPlan. Remediation policy:
//! - `unsafe-construct` on `eval` replaces the callee with
//!   `ast.literal_eval`; `exec` has no safe automated fix and is reported.
//! - `oversized-function` inserts a refactor note above the definition.
//! - everything else (parse errors included) passes through report-only.

use super::plan::{notes, PatchOperation, PatchPlan, ReportOnly};
use crate::features::graph::DependencyGraph;
use crate::features::indexing::SourceIndex;
use crate::shared::models::{rules, Finding, Span};

pub struct FixPlanner;

impl FixPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Produce the plan for a set of findings.
    ///
    /// Operation order: severity descending, then unit position in the
    /// dependency topological order (dependencies first, advisory), then
    /// ascending location within a unit. Within one unit no two operations
    /// have conflicting edit ranges; when candidates collide the
    /// highest-severity one wins and the loser is reported as superseded.
    pub fn plan(
        &self,
        findings: &[Finding],
        graph: &DependencyGraph,
        index: &SourceIndex,
    ) -> PatchPlan {
        let mut candidates: Vec<PatchOperation> = Vec::new();
        let mut report_only: Vec<ReportOnly> = Vec::new();

        for finding in findings {
            match self.remediate(finding, index) {
                Some(op) => candidates.push(op),
                None => report_only.push(ReportOnly {
                    finding: finding.clone(),
                    note: notes::NO_REMEDIATION.to_string(),
                }),
            }
        }

        let (mut operations, superseded) = dedup_conflicts(candidates);
        report_only.extend(superseded);

        operations.sort_by(|a, b| {
            let key = |op: &PatchOperation| {
                (
                    std::cmp::Reverse(op.finding.severity),
                    graph.topo_position(&op.unit_path).unwrap_or(usize::MAX),
                    op.unit_path.clone(),
                    op.span.start_byte,
                )
            };
            key(a).cmp(&key(b))
        });

        tracing::info!(
            operations = operations.len(),
            report_only = report_only.len(),
            "plan ready"
        );
        PatchPlan {
            operations,
            report_only,
        }
    }

    fn remediate(&self, finding: &Finding, index: &SourceIndex) -> Option<PatchOperation> {
        let text = index.get(&finding.unit_path)?.text().to_string();

        match finding.rule_id.as_str() {
            rules::UNSAFE_CONSTRUCT => {
                let callee = text
                    .get(finding.span.start_byte as usize..finding.span.end_byte as usize)?;
                if callee != "eval" {
                    return None;
                }
                Some(PatchOperation::replace(
                    finding.clone(),
                    finding.span,
                    callee,
                    "ast.literal_eval",
                ))
            }
            rules::OVERSIZED_FUNCTION => {
                let line_start = line_start_byte(&text, finding.span.start_byte as usize);
                let indent: String = text[line_start..]
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect();
                let note = format!("{}# refactor: {}\n", indent, finding.message);
                Some(PatchOperation::insert_note(
                    finding.clone(),
                    Span::point(finding.span.start_line, 0, line_start as u32),
                    note,
                ))
            }
            _ => None,
        }
    }
}

impl Default for FixPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of the start of the line containing `byte`
fn line_start_byte(text: &str, byte: usize) -> usize {
    let upto = byte.min(text.len());
    text[..upto].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Resolve edit-range conflicts within each unit: candidates are considered
/// severity-descending (ties by ascending location) and a candidate is kept
/// only if it conflicts with no already-kept operation. Dropped candidates
/// come back as superseded report-only findings.
fn dedup_conflicts(mut candidates: Vec<PatchOperation>) -> (Vec<PatchOperation>, Vec<ReportOnly>) {
    candidates.sort_by(|a, b| {
        (
            &a.unit_path,
            std::cmp::Reverse(a.finding.severity),
            a.span.start_byte,
        )
            .cmp(&(
                &b.unit_path,
                std::cmp::Reverse(b.finding.severity),
                b.span.start_byte,
            ))
    });

    let mut kept: Vec<PatchOperation> = Vec::new();
    let mut superseded = Vec::new();

    for candidate in candidates {
        if kept.iter().any(|op| op.conflicts_with(&candidate)) {
            superseded.push(ReportOnly {
                finding: candidate.finding,
                note: notes::SUPERSEDED.to_string(),
            });
        } else {
            kept.push(candidate);
        }
    }

    (kept, superseded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::features::detection::IssueDetector;
    use crate::features::graph::DependencyGraphBuilder;
    use crate::features::planning::plan::OperationKind;
    use crate::shared::models::Severity;
    use proptest::prelude::*;

    fn index_of(files: &[(&str, &str)]) -> SourceIndex {
        let mut index = SourceIndex::new();
        for (path, text) in files {
            index.insert_unit(path.to_string(), text.to_string());
        }
        index
    }

    fn plan_for(
        files: &[(&str, &str)],
        config: &DetectorConfig,
    ) -> (PatchPlan, SourceIndex) {
        let mut index = index_of(files);
        let (graph, parse_findings) = DependencyGraphBuilder::new().build(&mut index).unwrap();
        let mut findings = parse_findings;
        findings.extend(IssueDetector::new(config).detect(&mut index));
        let plan = FixPlanner::new().plan(&findings, &graph, &index);
        (plan, index)
    }

    #[test]
    fn test_eval_becomes_replace_operation() {
        let (plan, _) = plan_for(
            &[("app.py", "def f(s):\n    return eval(s)\n")],
            &DetectorConfig::default(),
        );

        assert_eq!(plan.len(), 1);
        let op = &plan.operations[0];
        assert_eq!(op.kind, OperationKind::ReplaceSpan);
        assert_eq!(op.original_text, "eval");
        assert_eq!(op.replacement_text, "ast.literal_eval");
    }

    #[test]
    fn test_exec_is_report_only() {
        let (plan, _) = plan_for(
            &[("app.py", "exec(\"print(1)\")\n")],
            &DetectorConfig::default(),
        );

        assert!(plan.is_empty());
        assert_eq!(plan.report_only.len(), 1);
        assert_eq!(plan.report_only[0].note, notes::NO_REMEDIATION);
    }

    #[test]
    fn test_parse_error_is_report_only() {
        let (plan, _) = plan_for(&[("bad.py", "def broken(:\n")], &DetectorConfig::default());

        assert!(plan.is_empty());
        assert_eq!(plan.report_only.len(), 1);
        assert_eq!(plan.report_only[0].finding.rule_id, rules::PARSE_ERROR);
    }

    #[test]
    fn test_oversized_function_gets_note_above_def() {
        let mut src = String::from("def big():\n");
        for i in 0..8 {
            src.push_str(&format!("    v{} = {}\n", i, i));
        }
        let config = DetectorConfig {
            max_function_statements: 5,
            max_function_branches: 10,
        };
        let (plan, _) = plan_for(&[("app.py", &src)], &config);

        assert_eq!(plan.len(), 1);
        let op = &plan.operations[0];
        assert_eq!(op.kind, OperationKind::InsertNote);
        assert_eq!(op.span.start_byte, 0);
        assert!(op.span.is_empty());
        assert!(op.replacement_text.starts_with("# refactor:"));
        assert!(op.replacement_text.ends_with('\n'));
    }

    #[test]
    fn test_unsafe_call_inside_oversized_function_keeps_both_ops() {
        // The finding spans overlap (callee inside function body) but the
        // edit ranges do not, so both operations survive.
        let mut src = String::from("def big(s):\n");
        for i in 0..8 {
            src.push_str(&format!("    v{} = {}\n", i, i));
        }
        src.push_str("    return eval(s)\n");
        let config = DetectorConfig {
            max_function_statements: 5,
            max_function_branches: 10,
        };
        let (plan, _) = plan_for(&[("app.py", &src)], &config);

        assert_eq!(plan.len(), 2);
        assert!(plan.has_disjoint_unit_spans());
        // Severity descending: the eval replacement (high) comes first
        assert_eq!(plan.operations[0].finding.severity, Severity::High);
        assert_eq!(plan.operations[1].finding.severity, Severity::Medium);
    }

    #[test]
    fn test_unit_batches_follow_dependency_order() {
        let config = DetectorConfig::default();
        let (plan, _) = plan_for(
            &[
                ("main.py", "import util\nx = eval(\"1\")\n"),
                ("util.py", "y = eval(\"2\")\n"),
            ],
            &config,
        );

        // Same severity: dependency (util.py) is patched before main.py
        let paths: Vec<&str> = plan
            .operations
            .iter()
            .map(|op| op.unit_path.as_str())
            .collect();
        assert_eq!(paths, vec!["util.py", "main.py"]);
    }

    fn arb_op(unit: &'static str) -> impl Strategy<Value = PatchOperation> {
        (0u32..300, 0u32..20, 0usize..3).prop_map(move |(start, len, sev)| {
            let severity = [Severity::Low, Severity::Medium, Severity::High][sev];
            let span = Span::new(1, 0, 1, 0, start, start + len);
            let finding = Finding::new(unit, "rule", severity, span, "m");
            PatchOperation::replace(finding, span, "x", "y")
        })
    }

    proptest! {
        #[test]
        fn prop_dedup_output_has_no_conflicts(ops in proptest::collection::vec(arb_op("u.py"), 0..20)) {
            let total = ops.len();
            let (kept, superseded) = dedup_conflicts(ops);

            prop_assert_eq!(kept.len() + superseded.len(), total);
            for (i, a) in kept.iter().enumerate() {
                for b in &kept[i + 1..] {
                    prop_assert!(!a.conflicts_with(b));
                }
            }
        }
    }
}
