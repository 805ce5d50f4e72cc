//! Findings emitted by analysis
//!
//! A Finding ties a rule hit to a source location. Findings are immutable
//! once created; many findings may exist per unit.

use serde::{Deserialize, Serialize};

use super::span::Span;

/// Finding severity, ordered: Low < Medium < High
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rule identifiers for the built-in rule set
pub mod rules {
    pub const PARSE_ERROR: &str = "parse-error";
    pub const UNSAFE_CONSTRUCT: &str = "unsafe-construct";
    pub const OVERSIZED_FUNCTION: &str = "oversized-function";
}

/// A single analysis finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Path of the source unit this finding belongs to
    pub unit_path: String,

    /// Identifier of the rule that produced the finding
    pub rule_id: String,

    pub severity: Severity,

    /// Location of the offending construct
    pub span: Span,

    /// Human-readable description
    pub message: String,
}

impl Finding {
    pub fn new(
        unit_path: impl Into<String>,
        rule_id: impl Into<String>,
        severity: Severity,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            unit_path: unit_path.into(),
            rule_id: rule_id.into(),
            severity,
            span,
            message: message.into(),
        }
    }
}
