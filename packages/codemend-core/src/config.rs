//! Pipeline configuration
//!
//! YAML-loadable configuration with defaults for every field, so an absent
//! or partial config file always yields a runnable pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::models::Result;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodemendConfig {
    pub scan: ScanConfig,
    pub detector: DetectorConfig,
    pub tests: TestConfig,
}

impl CodemendConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

/// Repository scanning options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions treated as source units
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string()],
        }
    }
}

/// Detection rule thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Statement count above which a function is flagged
    pub max_function_statements: usize,

    /// Cyclomatic branch count above which a function is flagged
    pub max_function_branches: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_function_statements: 40,
            max_function_branches: 10,
        }
    }
}

/// Test oracle options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Test command override (e.g. "pytest -q"). When unset, "pytest -q" is
    /// used if the repository has a tests/ directory, otherwise the oracle
    /// falls back to per-unit import checks.
    pub command: Option<String>,

    /// Timeout for one test-suite invocation
    pub timeout_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: 30,
        }
    }
}
