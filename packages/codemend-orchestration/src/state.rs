//! Run state machine
//!
//! One mutable PipelineRunState travels through the stages; nothing is
//! global. Stage transitions follow an explicit table and anything
//! out of order is an error, so a stage can never observe the artifacts of
//! a stage that has not run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use codemend_core::{
    BackupStore, DependencyGraph, Finding, PatchPlan, SourceIndex, TestVerdictSet,
};

use crate::error::{PipelineError, Result};

/// Pipeline stages in execution order, plus the failure terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunStage {
    Created,
    Indexed,
    GraphBuilt,
    Analyzed,
    TestedBaseline,
    Planned,
    Patched,
    TestedPostFix,
    Reported,
    Failed { stage: String },
}

impl RunStage {
    pub fn name(&self) -> &'static str {
        match self {
            RunStage::Created => "created",
            RunStage::Indexed => "indexed",
            RunStage::GraphBuilt => "graph_built",
            RunStage::Analyzed => "analyzed",
            RunStage::TestedBaseline => "tested_baseline",
            RunStage::Planned => "planned",
            RunStage::Patched => "patched",
            RunStage::TestedPostFix => "tested_post_fix",
            RunStage::Reported => "reported",
            RunStage::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStage::Reported | RunStage::Failed { .. })
    }

    /// The single legal successor on the happy path
    fn next(&self) -> Option<RunStage> {
        match self {
            RunStage::Created => Some(RunStage::Indexed),
            RunStage::Indexed => Some(RunStage::GraphBuilt),
            RunStage::GraphBuilt => Some(RunStage::Analyzed),
            RunStage::Analyzed => Some(RunStage::TestedBaseline),
            RunStage::TestedBaseline => Some(RunStage::Planned),
            RunStage::Planned => Some(RunStage::Patched),
            RunStage::Patched => Some(RunStage::TestedPostFix),
            RunStage::TestedPostFix => Some(RunStage::Reported),
            RunStage::Reported | RunStage::Failed { .. } => None,
        }
    }

    /// A transition is legal when it is the happy-path successor, or a move
    /// from any non-terminal stage to Failed.
    pub fn can_transition_to(&self, to: &RunStage) -> bool {
        if let RunStage::Failed { .. } = to {
            return !self.is_terminal();
        }
        self.next().as_ref() == Some(to)
    }
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::Failed { stage } => write!(f, "failed({})", stage),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Everything a stage may read or extend during one run
pub struct PipelineRunState {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stage: RunStage,

    pub index: SourceIndex,
    pub graph: Option<DependencyGraph>,
    pub findings: Vec<Finding>,
    pub baseline: Option<TestVerdictSet>,
    pub plan: Option<PatchPlan>,
    pub backups: BackupStore,
    pub post_fix: Option<TestVerdictSet>,
}

impl PipelineRunState {
    pub fn new(index: SourceIndex) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            stage: RunStage::Created,
            index,
            graph: None,
            findings: Vec::new(),
            baseline: None,
            plan: None,
            backups: BackupStore::new(),
            post_fix: None,
        }
    }

    /// Move to the next stage, enforcing the transition table
    pub fn transition(&mut self, to: RunStage) -> Result<()> {
        if !self.stage.can_transition_to(&to) {
            return Err(PipelineError::InvalidStateTransition {
                from: self.stage.to_string(),
                to: to.to_string(),
            });
        }
        tracing::debug!(run_id = %self.run_id, from = %self.stage, to = %to, "stage transition");
        self.stage = to;
        Ok(())
    }

    /// Mark the run failed at the stage it was trying to reach
    pub fn fail(&mut self, stage: &str) {
        // Always legal from a non-terminal stage; ignore at terminal
        let _ = self.transition(RunStage::Failed {
            stage: stage.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut state = PipelineRunState::new(SourceIndex::new());
        for stage in [
            RunStage::Indexed,
            RunStage::GraphBuilt,
            RunStage::Analyzed,
            RunStage::TestedBaseline,
            RunStage::Planned,
            RunStage::Patched,
            RunStage::TestedPostFix,
            RunStage::Reported,
        ] {
            state.transition(stage).unwrap();
        }
        assert!(state.stage.is_terminal());
    }

    #[test]
    fn test_out_of_order_transition_rejected() {
        let mut state = PipelineRunState::new(SourceIndex::new());
        state.transition(RunStage::Indexed).unwrap();

        let result = state.transition(RunStage::Patched);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidStateTransition { .. })
        ));
        assert_eq!(state.stage, RunStage::Indexed);
    }

    #[test]
    fn test_failed_reachable_from_any_non_terminal() {
        let mut state = PipelineRunState::new(SourceIndex::new());
        state.transition(RunStage::Indexed).unwrap();
        state.transition(RunStage::GraphBuilt).unwrap();
        state.fail("analyzed");
        assert_eq!(
            state.stage,
            RunStage::Failed {
                stage: "analyzed".to_string()
            }
        );
        assert!(state.stage.is_terminal());
    }

    #[test]
    fn test_terminal_stages_have_no_successor() {
        let reported = RunStage::Reported;
        assert!(!reported.can_transition_to(&RunStage::Indexed));
        assert!(!reported.can_transition_to(&RunStage::Failed {
            stage: "x".to_string()
        }));
    }
}
