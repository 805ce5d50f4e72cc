//! Structured run result
//!
//! The single JSON-serializable object a run produces: every finding, the
//! plan with per-operation outcomes, both verdict sets, regressions, the
//! backup snapshots, and the post-patch texts of touched units.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use codemend_core::{Finding, PatchOperation, ReportOnly, TestVerdictSet};

use crate::state::RunStage;

/// Run statistics for quick inspection
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub unit_count: usize,
    pub edge_count: usize,
    pub external_count: usize,
    pub cycle_count: usize,
    pub finding_count: usize,
    pub operations_applied: usize,
    pub operations_failed: usize,
    pub operations_skipped: usize,
    pub duration_ms: u64,
}

/// Everything a caller needs to inspect, report on, or undo a run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub final_stage: RunStage,

    /// Every finding of the run, remediated or not
    pub findings: Vec<Finding>,

    /// Findings reported without an automated fix, with the reason
    pub report_only: Vec<ReportOnly>,

    /// Planned operations with their final statuses
    pub operations: Vec<PatchOperation>,

    pub baseline: Option<TestVerdictSet>,
    pub post_fix: Option<TestVerdictSet>,

    /// Scopes that passed baseline and fail post-fix
    pub regressions: Vec<String>,

    /// Pre-patch text per touched unit; the caller's restore option
    pub backups: BTreeMap<String, String>,

    /// Current text per touched unit, for downstream quality checks
    pub patched_texts: BTreeMap<String, String>,

    pub stats: RunStats,
}

impl PipelineResult {
    /// True when every operation applied and nothing regressed
    pub fn is_clean(&self) -> bool {
        self.regressions.is_empty()
            && self.stats.operations_failed == 0
            && self.stats.operations_skipped == 0
    }
}
