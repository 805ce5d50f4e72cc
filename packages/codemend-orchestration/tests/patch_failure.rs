//! Failure-path behavior of patch application: stale spans, rollback, and
//! isolation between units, verified against a repository on disk.

use std::fs;

use pretty_assertions::assert_eq;

use codemend_core::{
    rules, BackupStore, Finding, OperationStatus, PatchApplier, PatchOperation, PatchPlan,
    Severity, SourceIndex, Span,
};

fn byte_span(start: u32, end: u32) -> Span {
    Span::new(1, start, 1, end, start, end)
}

fn replace_op(path: &str, span: Span, original: &str, replacement: &str) -> PatchOperation {
    let finding = Finding::new(path, rules::UNSAFE_CONSTRUCT, Severity::High, span, "m");
    PatchOperation::replace(finding, span, original, replacement)
}

#[test]
fn stale_span_restores_disk_text_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let text = "value = eval(data)\n";
    fs::write(dir.path().join("m.py"), text).unwrap();

    let mut index = SourceIndex::with_root(dir.path());
    index.insert_unit("m.py", text);

    // The text drifted since planning: the expectation no longer matches
    let mut plan = PatchPlan {
        operations: vec![replace_op(
            "m.py",
            byte_span(8, 12),
            "exec",
            "ast.literal_eval",
        )],
        report_only: Vec::new(),
    };
    let mut backups = BackupStore::new();

    let summary = PatchApplier::new().apply(&mut plan, &mut index, &mut backups);

    assert_eq!(summary.applied, 0);
    assert_eq!(summary.rolled_back_units, vec!["m.py".to_string()]);
    assert!(matches!(
        plan.operations[0].status,
        OperationStatus::Failed(_)
    ));
    assert_eq!(fs::read_to_string(dir.path().join("m.py")).unwrap(), text);
    // The backup stays available after the rollback
    assert_eq!(backups.get("m.py").unwrap().original_text, text);
}

#[test]
fn failure_mid_unit_undoes_earlier_edits_in_that_unit() {
    let dir = tempfile::tempdir().unwrap();
    let text = "a = eval(x)\nb = eval(y)\n";
    fs::write(dir.path().join("m.py"), text).unwrap();

    let mut index = SourceIndex::with_root(dir.path());
    index.insert_unit("m.py", text);

    let mut plan = PatchPlan {
        operations: vec![
            replace_op("m.py", byte_span(4, 8), "eval", "ast.literal_eval"),
            replace_op("m.py", byte_span(16, 20), "wrong", "ast.literal_eval"),
        ],
        report_only: Vec::new(),
    };
    let mut backups = BackupStore::new();

    let summary = PatchApplier::new().apply(&mut plan, &mut index, &mut backups);

    // First edit applied, then the stale second edit failed the whole unit
    assert_eq!(summary.applied, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(plan.operations[0].status, OperationStatus::Skipped);
    assert!(matches!(
        plan.operations[1].status,
        OperationStatus::Failed(_)
    ));
    assert_eq!(fs::read_to_string(dir.path().join("m.py")).unwrap(), text);
}

#[test]
fn failing_unit_does_not_disturb_other_units() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.py"), "x = eval(s)\n").unwrap();
    fs::write(dir.path().join("good.py"), "y = eval(t)\n").unwrap();

    let mut index = SourceIndex::with_root(dir.path());
    index.insert_unit("bad.py", "x = eval(s)\n");
    index.insert_unit("good.py", "y = eval(t)\n");

    let mut plan = PatchPlan {
        operations: vec![
            replace_op("bad.py", byte_span(4, 8), "stale", "ast.literal_eval"),
            replace_op("good.py", byte_span(4, 8), "eval", "ast.literal_eval"),
        ],
        report_only: Vec::new(),
    };
    let mut backups = BackupStore::new();

    let summary = PatchApplier::new().apply(&mut plan, &mut index, &mut backups);

    assert_eq!(summary.applied, 1);
    assert_eq!(summary.touched_units, vec!["good.py".to_string()]);
    assert_eq!(summary.rolled_back_units, vec!["bad.py".to_string()]);
    assert_eq!(
        fs::read_to_string(dir.path().join("bad.py")).unwrap(),
        "x = eval(s)\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("good.py")).unwrap(),
        "y = ast.literal_eval(t)\n"
    );
}

#[test]
fn one_backup_per_unit_even_with_many_ops() {
    let text = "a = eval(x)\nb = eval(y)\n";
    let mut index = SourceIndex::new();
    index.insert_unit("m.py", text);

    let mut plan = PatchPlan {
        operations: vec![
            replace_op("m.py", byte_span(4, 8), "eval", "ast.literal_eval"),
            replace_op("m.py", byte_span(16, 20), "eval", "ast.literal_eval"),
        ],
        report_only: Vec::new(),
    };
    let mut backups = BackupStore::new();

    PatchApplier::new().apply(&mut plan, &mut index, &mut backups);

    assert_eq!(backups.len(), 1);
    assert_eq!(backups.get("m.py").unwrap().original_text, text);
}
