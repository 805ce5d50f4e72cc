//! Patch applier
//!
//! Applies a PatchPlan unit by unit. Spans were measured against the
//! pre-patch snapshot, so each edit position is adjusted by the length
//! deltas of earlier edits that ended at or before it. A unit's snapshot is
//! backed up before its first write; any failure inside a unit rolls that
//! unit back and leaves every other unit alone.

use serde::Serialize;

use super::backup::BackupStore;
use crate::features::indexing::SourceIndex;
use crate::features::planning::{OperationStatus, PatchPlan};
use crate::shared::models::CodemendError;

/// Counts and unit lists for the run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplySummary {
    pub applied: usize,
    pub failed: usize,
    pub skipped: usize,

    /// Units whose text changed and stayed changed
    pub touched_units: Vec<String>,

    /// Units restored from backup after a failure
    pub rolled_back_units: Vec<String>,
}

pub struct PatchApplier;

impl PatchApplier {
    pub fn new() -> Self {
        Self
    }

    /// Apply every operation in the plan, updating operation statuses in
    /// place. Failures never abort the whole application; they fail the
    /// unit they occur in.
    pub fn apply(
        &self,
        plan: &mut PatchPlan,
        index: &mut SourceIndex,
        backups: &mut BackupStore,
    ) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for unit_path in plan.unit_paths() {
            self.apply_unit(&unit_path, plan, index, backups, &mut summary);
        }

        tracing::info!(
            applied = summary.applied,
            failed = summary.failed,
            skipped = summary.skipped,
            "patch application complete"
        );
        summary
    }

    fn apply_unit(
        &self,
        unit_path: &str,
        plan: &mut PatchPlan,
        index: &mut SourceIndex,
        backups: &mut BackupStore,
        summary: &mut ApplySummary,
    ) {
        let op_indices = plan.ops_for_unit(unit_path);

        let Some(unit) = index.get(unit_path) else {
            for &idx in &op_indices {
                plan.operations[idx].status =
                    OperationStatus::Failed(format!("unit not in index: {}", unit_path));
                summary.failed += 1;
            }
            return;
        };

        let snapshot = unit.text().to_string();
        backups.ensure(unit_path, &snapshot);

        let mut working = snapshot.clone();
        // Applied edits in snapshot coordinates: (start, end, length delta)
        let mut edits: Vec<(u32, u32, i64)> = Vec::new();
        let mut unit_applied = 0usize;
        let mut failed_at: Option<usize> = None;

        for (pos, &idx) in op_indices.iter().enumerate() {
            let op = plan.operations[idx].clone();

            let offset: i64 = edits
                .iter()
                .filter(|(_, end, _)| *end <= op.span.start_byte)
                .map(|(_, _, delta)| *delta)
                .sum();
            let start = op.span.start_byte as i64 + offset;
            let end = op.span.end_byte as i64 + offset;

            let live = if start >= 0 && end >= start {
                working.get(start as usize..end as usize)
            } else {
                None
            };

            match live {
                Some(live) if live == op.original_text => {
                    working.replace_range(start as usize..end as usize, &op.replacement_text);
                    edits.push((op.span.start_byte, op.span.end_byte, op.length_delta()));
                    plan.operations[idx].status = OperationStatus::Applied;
                    unit_applied += 1;
                }
                Some(live) => {
                    let err = CodemendError::stale_span(format!(
                        "{}: expected {:?}, found {:?}",
                        op.span, op.original_text, live
                    ))
                    .with_file(unit_path);
                    plan.operations[idx].status = OperationStatus::Failed(err.to_string());
                    failed_at = Some(pos);
                    break;
                }
                None => {
                    let err = CodemendError::stale_span(format!(
                        "{}: range out of bounds",
                        op.span
                    ))
                    .with_file(unit_path);
                    plan.operations[idx].status = OperationStatus::Failed(err.to_string());
                    failed_at = Some(pos);
                    break;
                }
            }
        }

        if let Some(pos) = failed_at {
            summary.failed += 1;
            // Edits applied before the failure are undone by the rollback
            for &idx in op_indices[..pos].iter().chain(&op_indices[pos + 1..]) {
                plan.operations[idx].status = OperationStatus::Skipped;
                summary.skipped += 1;
            }
            self.rollback(unit_path, index, backups, summary);
            return;
        }

        let write = index
            .set_unit_text(unit_path, working)
            .and_then(|_| index.flush_unit(unit_path));
        match write {
            Ok(()) => {
                summary.applied += unit_applied;
                summary.touched_units.push(unit_path.to_string());
            }
            Err(e) => {
                tracing::warn!("patch write failed for {}: {}", unit_path, e);
                for &idx in &op_indices {
                    plan.operations[idx].status =
                        OperationStatus::Failed(format!("write failed: {}", e));
                    summary.failed += 1;
                }
                self.rollback(unit_path, index, backups, summary);
            }
        }
    }

    /// Restore a unit from its backup, in memory and on disk
    fn rollback(
        &self,
        unit_path: &str,
        index: &mut SourceIndex,
        backups: &BackupStore,
        summary: &mut ApplySummary,
    ) {
        let Some(backup) = backups.get(unit_path) else {
            tracing::error!("no backup to roll back {}", unit_path);
            return;
        };
        if let Err(e) = index.set_unit_text(unit_path, backup.original_text.clone()) {
            tracing::error!("rollback of {} failed in memory: {}", unit_path, e);
            return;
        }
        if let Err(e) = index.flush_unit(unit_path) {
            tracing::error!("rollback of {} failed on disk: {}", unit_path, e);
        }
        summary.rolled_back_units.push(unit_path.to_string());
        tracing::warn!("rolled back {}", unit_path);
    }
}

impl Default for PatchApplier {
    fn default() -> Self {
        Self::new()
    }
}
