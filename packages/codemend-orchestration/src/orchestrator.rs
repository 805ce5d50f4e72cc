//! Sequential pipeline orchestrator
//!
//! Drives one run through scan, graph build, detection, baseline tests,
//! planning, patching, and post-fix tests, then assembles the result.
//! Stage failures that are recoverable become findings or statuses; only an
//! empty index or a graph-build crash aborts the run.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use codemend_core::{
    regressions, CodemendConfig, CodemendError, DependencyGraphBuilder, FixPlanner, IssueDetector,
    PatchApplier, RepoScanner, SourceIndex, TestOracle,
};

use crate::error::{PipelineError, Result};
use crate::result::{PipelineResult, RunStats};
use crate::state::{PipelineRunState, RunStage};

pub struct PipelineOrchestrator {
    config: CodemendConfig,
}

impl PipelineOrchestrator {
    pub fn new(config: CodemendConfig) -> Self {
        Self { config }
    }

    /// Scan a repository and run the full pipeline over it
    pub fn run(&self, repo_root: impl AsRef<Path>) -> Result<PipelineResult> {
        let scanner = RepoScanner::new(self.config.scan.clone());
        let index = scanner
            .scan(repo_root)
            .map_err(|e| PipelineError::stage_failed("indexed", e))?;
        self.run_with_index(index)
    }

    /// Run the pipeline over an already-built index
    pub fn run_with_index(&self, index: SourceIndex) -> Result<PipelineResult> {
        let started = Instant::now();
        let mut state = PipelineRunState::new(index);
        tracing::info!(run_id = %state.run_id, units = state.index.len(), "run started");

        if state.index.is_empty() {
            state.fail("indexed");
            let root = state
                .index
                .root()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string());
            return Err(PipelineError::EmptyIndex(root));
        }
        state.transition(RunStage::Indexed)?;

        match DependencyGraphBuilder::new().build(&mut state.index) {
            Ok((graph, parse_findings)) => {
                state.findings.extend(parse_findings);
                state.graph = Some(graph);
            }
            Err(e) => {
                state.fail("graph_built");
                return Err(PipelineError::stage_failed("graph_built", e));
            }
        }
        state.transition(RunStage::GraphBuilt)?;

        let detector = IssueDetector::new(&self.config.detector);
        state.findings.extend(detector.detect(&mut state.index));
        state.transition(RunStage::Analyzed)?;

        let oracle = TestOracle::new(self.config.tests.clone());
        state.baseline = Some(oracle.run(&mut state.index));
        state.transition(RunStage::TestedBaseline)?;

        let graph = state
            .graph
            .as_ref()
            .ok_or_else(|| PipelineError::Core(CodemendError::internal("graph missing")))?;
        let plan = FixPlanner::new().plan(&state.findings, graph, &state.index);
        state.plan = Some(plan);
        state.transition(RunStage::Planned)?;

        let mut plan = state
            .plan
            .take()
            .ok_or_else(|| PipelineError::Core(CodemendError::internal("plan missing")))?;
        let summary = PatchApplier::new().apply(&mut plan, &mut state.index, &mut state.backups);
        state.plan = Some(plan);
        state.transition(RunStage::Patched)?;

        state.post_fix = Some(oracle.run(&mut state.index));
        state.transition(RunStage::TestedPostFix)?;

        let regression_list = match (&state.baseline, &state.post_fix) {
            (Some(baseline), Some(post_fix)) => regressions(baseline, post_fix),
            _ => Vec::new(),
        };

        // Backups outlive the run whenever the caller might need to restore:
        // any regression, failed, or skipped operation keeps them.
        if regression_list.is_empty() && summary.failed == 0 && summary.skipped == 0 {
            state.backups.clear();
        } else if !regression_list.is_empty() {
            tracing::warn!(
                run_id = %state.run_id,
                regressions = ?regression_list,
                "post-fix regressions detected; backups retained"
            );
        }

        let mut patched_texts = BTreeMap::new();
        for path in &summary.touched_units {
            if let Some(unit) = state.index.get(path) {
                patched_texts.insert(path.clone(), unit.text().to_string());
            }
        }

        let plan = state
            .plan
            .take()
            .ok_or_else(|| PipelineError::Core(CodemendError::internal("plan missing")))?;
        let graph_stats = state
            .graph
            .as_ref()
            .map(|g| g.stats())
            .unwrap_or_default();

        state.transition(RunStage::Reported)?;
        tracing::info!(run_id = %state.run_id, stage = %state.stage, "run complete");

        Ok(PipelineResult {
            run_id: state.run_id.to_string(),
            started_at: state.started_at,
            final_stage: state.stage,
            stats: RunStats {
                unit_count: state.index.len(),
                edge_count: graph_stats.edge_count,
                external_count: graph_stats.external_count,
                cycle_count: graph_stats.cycle_count,
                finding_count: state.findings.len(),
                operations_applied: summary.applied,
                operations_failed: summary.failed,
                operations_skipped: summary.skipped,
                duration_ms: started.elapsed().as_millis() as u64,
            },
            findings: state.findings,
            report_only: plan.report_only.clone(),
            operations: plan.operations,
            baseline: state.baseline,
            post_fix: state.post_fix,
            regressions: regression_list,
            backups: state.backups.as_text_map(),
            patched_texts,
        })
    }
}
