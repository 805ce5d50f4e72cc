//! Error types for the codemend-core crate
//!
//! Unified error handling across all features: categorized kinds matching
//! the pipeline stages, optional file/line context, and source chaining.
//!
//! Per-unit failures (parse errors, stale spans, patch write errors) are
//! recorded and isolated by the components that hit them; this type is for
//! the cases that must propagate.

use std::fmt;

/// Error kind categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source text could not be parsed
    Parse,
    /// Dependency graph construction errors
    GraphBuild,
    /// Issue detection errors
    Detection,
    /// Fix planning errors
    Planning,
    /// Patch offsets no longer match the unit's live text
    StaleSpan,
    /// I/O failure while applying a patch
    PatchWrite,
    /// Test runner invocation errors
    TestRun,
    /// Configuration errors
    Config,
    /// IO errors
    Io,
    /// Internal errors (bugs)
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::GraphBuild => "graph_build",
            ErrorKind::Detection => "detection",
            ErrorKind::Planning => "planning",
            ErrorKind::StaleSpan => "stale_span",
            ErrorKind::PatchWrite => "patch_write",
            ErrorKind::TestRun => "test_run",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Unified error type
#[derive(Debug)]
pub struct CodemendError {
    pub kind: ErrorKind,
    pub message: String,
    pub file_path: Option<String>,
    pub line: Option<u32>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CodemendError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file_path: None,
            line: None,
            source: None,
        }
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn stale_span(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StaleSpan, message)
    }

    pub fn patch_write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PatchWrite, message)
    }

    pub fn test_run(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TestRun, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for CodemendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)?;
        if let Some(ref file) = self.file_path {
            write!(f, " in {}", file)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CodemendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for CodemendError {
    fn from(err: std::io::Error) -> Self {
        CodemendError::new(ErrorKind::Io, format!("I/O error: {}", err)).with_source(err)
    }
}

impl From<serde_yaml::Error> for CodemendError {
    fn from(err: serde_yaml::Error) -> Self {
        CodemendError::config(format!("YAML config error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for CodemendError {
    fn from(err: serde_json::Error) -> Self {
        CodemendError::new(ErrorKind::Io, format!("JSON serialization error: {}", err))
            .with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CodemendError>;
