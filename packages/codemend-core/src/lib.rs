//! codemend-core: analysis and patching engine
//!
//! Building blocks of the repository maintenance pipeline: repo scanning and
//! indexing, Python parsing, dependency graph construction, static issue
//! detection, fix planning, backup-guarded patch application, and test
//! verification. Orchestration of these stages lives in
//! `codemend-orchestration`.

pub mod config;
pub mod features;
pub mod shared;

pub use config::{CodemendConfig, DetectorConfig, ScanConfig, TestConfig};
pub use features::detection::{DetectionRule, IssueDetector};
pub use features::graph::{DependencyGraph, DependencyGraphBuilder, GraphStats};
pub use features::indexing::{RepoScanner, SourceIndex, SourceUnit};
pub use features::parsing::{ParsedTree, Parser, TreeSitterParser};
pub use features::patching::{ApplySummary, Backup, BackupStore, PatchApplier};
pub use features::planning::{
    FixPlanner, OperationKind, OperationStatus, PatchOperation, PatchPlan, ReportOnly,
};
pub use features::testing::{regressions, TestOracle, TestVerdict, TestVerdictSet, VerdictMode};
pub use shared::models::{rules, CodemendError, ErrorKind, Finding, Result, Severity, Span};
