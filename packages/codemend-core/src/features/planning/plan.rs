//! Patch plan model
//!
//! A PatchPlan holds the ordered edit operations plus the findings that get
//! reported without an automated fix. Operation spans are byte ranges
//! against the unit text as it was when the plan was produced.

use serde::{Deserialize, Serialize};

use crate::shared::models::{Finding, Span};

/// What an operation does to the unit text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Replace the span's text with `replacement_text`
    ReplaceSpan,

    /// Insert `replacement_text` at the span's start (span is empty)
    InsertNote,
}

/// Lifecycle of one operation through application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Planned,
    Applied,
    Skipped,
    Failed(String),
}

/// Notes attached to report-only findings
pub mod notes {
    /// A higher-severity operation claimed an overlapping edit range
    pub const SUPERSEDED: &str = "superseded";

    /// The rule has no safe automated fix
    pub const NO_REMEDIATION: &str = "no automated remediation";
}

/// One planned edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub unit_path: String,
    pub kind: OperationKind,

    /// Edit range in the pre-patch unit text
    pub span: Span,

    /// Text expected at `span` when the edit is applied (empty for inserts)
    pub original_text: String,

    pub replacement_text: String,

    /// The finding this operation remediates
    pub finding: Finding,

    pub status: OperationStatus,
}

impl PatchOperation {
    pub fn replace(
        finding: Finding,
        span: Span,
        original_text: impl Into<String>,
        replacement_text: impl Into<String>,
    ) -> Self {
        Self {
            unit_path: finding.unit_path.clone(),
            kind: OperationKind::ReplaceSpan,
            span,
            original_text: original_text.into(),
            replacement_text: replacement_text.into(),
            finding,
            status: OperationStatus::Planned,
        }
    }

    pub fn insert_note(finding: Finding, at: Span, note_text: impl Into<String>) -> Self {
        Self {
            unit_path: finding.unit_path.clone(),
            kind: OperationKind::InsertNote,
            span: at,
            original_text: String::new(),
            replacement_text: note_text.into(),
            finding,
            status: OperationStatus::Planned,
        }
    }

    /// Byte length delta this edit introduces once applied
    pub fn length_delta(&self) -> i64 {
        self.replacement_text.len() as i64 - self.span.byte_len() as i64
    }

    /// Edit ranges conflict when both are non-empty and overlap, or when
    /// they are the same insertion point.
    pub fn conflicts_with(&self, other: &PatchOperation) -> bool {
        if self.unit_path != other.unit_path {
            return false;
        }
        if self.span.is_empty() && other.span.is_empty() {
            return self.span.start_byte == other.span.start_byte;
        }
        self.span.overlaps(&other.span)
    }
}

/// A finding reported without an automated fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOnly {
    pub finding: Finding,
    pub note: String,
}

/// Ordered operations plus report-only findings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchPlan {
    pub operations: Vec<PatchOperation>,
    pub report_only: Vec<ReportOnly>,
}

impl PatchPlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Unit paths that have at least one operation, in plan order
    pub fn unit_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for op in &self.operations {
            if !paths.contains(&op.unit_path) {
                paths.push(op.unit_path.clone());
            }
        }
        paths
    }

    /// Indices of this unit's operations, in plan order
    pub fn ops_for_unit(&self, unit_path: &str) -> Vec<usize> {
        self.operations
            .iter()
            .enumerate()
            .filter(|(_, op)| op.unit_path == unit_path)
            .map(|(i, _)| i)
            .collect()
    }

    /// True when no two operations in the same unit have conflicting edit
    /// ranges. Holds for every planner output.
    pub fn has_disjoint_unit_spans(&self) -> bool {
        for (i, a) in self.operations.iter().enumerate() {
            for b in &self.operations[i + 1..] {
                if a.conflicts_with(b) {
                    return false;
                }
            }
        }
        true
    }
}
