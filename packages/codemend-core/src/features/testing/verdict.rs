//! Test verdicts
//!
//! A verdict set captures one oracle invocation. The pipeline runs the
//! oracle twice (baseline, post-fix) and compares the sets to surface
//! regressions distinctly from pre-existing failures.

use serde::{Deserialize, Serialize};

/// How the verdicts were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictMode {
    /// A whole-repo test command was executed
    Suite,

    /// Per-unit import/load checks (no test runner available)
    ImportCheck,
}

/// Outcome for one scope (the whole suite, or one unit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVerdict {
    pub scope: String,
    pub passed: bool,
    pub detail: String,
}

impl TestVerdict {
    pub fn new(scope: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            passed,
            detail: detail.into(),
        }
    }
}

/// All verdicts from one oracle invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVerdictSet {
    pub mode: VerdictMode,
    pub verdicts: Vec<TestVerdict>,
}

impl TestVerdictSet {
    pub fn new(mode: VerdictMode) -> Self {
        Self {
            mode,
            verdicts: Vec::new(),
        }
    }

    pub fn push(&mut self, verdict: TestVerdict) {
        self.verdicts.push(verdict);
    }

    pub fn get(&self, scope: &str) -> Option<&TestVerdict> {
        self.verdicts.iter().find(|v| v.scope == scope)
    }

    pub fn all_passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    pub fn failing_scopes(&self) -> Vec<String> {
        self.verdicts
            .iter()
            .filter(|v| !v.passed)
            .map(|v| v.scope.clone())
            .collect()
    }
}

/// Scopes that passed at baseline and fail post-fix.
///
/// Scopes failing in both runs are pre-existing failures, not regressions;
/// scopes absent from the post-fix set are not counted.
pub fn regressions(baseline: &TestVerdictSet, postfix: &TestVerdictSet) -> Vec<String> {
    baseline
        .verdicts
        .iter()
        .filter(|b| b.passed)
        .filter(|b| postfix.get(&b.scope).map_or(false, |p| !p.passed))
        .map(|b| b.scope.clone())
        .collect()
}
