//! Test oracle
//!
//! Runs the repository's test suite as a synchronous subprocess, bounded by
//! the configured timeout. Without a configured command and without a
//! tests/ directory, it falls back to per-unit import checks (a full parse
//! of each unit). Oracle failures are failing verdicts, never errors.

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::verdict::{TestVerdict, TestVerdictSet, VerdictMode};
use crate::config::TestConfig;
use crate::features::indexing::SourceIndex;
use crate::features::parsing::TreeSitterParser;
use crate::shared::models::CodemendError;

const SUITE_SCOPE: &str = "suite";
const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub struct TestOracle {
    config: TestConfig,
}

impl TestOracle {
    pub fn new(config: TestConfig) -> Self {
        Self { config }
    }

    /// Produce a verdict set for the repository's current state
    pub fn run(&self, index: &mut SourceIndex) -> TestVerdictSet {
        if let Some(command) = self.suite_command(index) {
            self.run_suite(&command, index)
        } else {
            self.run_import_checks(index)
        }
    }

    /// The command to run, when a runner is available
    fn suite_command(&self, index: &SourceIndex) -> Option<String> {
        if let Some(command) = &self.config.command {
            return Some(command.clone());
        }
        let root = index.root()?;
        if root.join("tests").is_dir() {
            Some("pytest -q".to_string())
        } else {
            None
        }
    }

    fn run_suite(&self, command: &str, index: &SourceIndex) -> TestVerdictSet {
        let mut set = TestVerdictSet::new(VerdictMode::Suite);
        set.push(self.execute(command, index));
        set
    }

    fn execute(&self, command: &str, index: &SourceIndex) -> TestVerdict {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return TestVerdict::new(SUITE_SCOPE, false, "empty test command");
        };

        let mut cmd = Command::new(program);
        cmd.args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(root) = index.root() {
            cmd.current_dir(root);
        }

        tracing::info!(command, "running test suite");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                let err = CodemendError::test_run(format!("failed to spawn {:?}: {}", command, e));
                return TestVerdict::new(SUITE_SCOPE, false, err.to_string());
            }
        };

        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_secs);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    return TestVerdict::new(
                        SUITE_SCOPE,
                        status.success(),
                        format!("exit status: {}", status),
                    );
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        let err = CodemendError::test_run(format!(
                            "timed out after {}s",
                            self.config.timeout_secs
                        ));
                        return TestVerdict::new(SUITE_SCOPE, false, err.to_string());
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let err = CodemendError::test_run(format!("wait failed: {}", e));
                    return TestVerdict::new(SUITE_SCOPE, false, err.to_string());
                }
            }
        }
    }

    /// Fallback: every unit must parse cleanly
    fn run_import_checks(&self, index: &mut SourceIndex) -> TestVerdictSet {
        let parser = TreeSitterParser::python();
        let mut set = TestVerdictSet::new(VerdictMode::ImportCheck);

        for path in index.paths() {
            let Some(unit) = index.get_mut(&path) else {
                continue;
            };
            let verdict = match unit.tree(&parser) {
                Ok(tree) if !tree.has_errors => TestVerdict::new(&path, true, "parsed"),
                Ok(tree) => {
                    let detail = tree
                        .errors
                        .first()
                        .map(|e| e.message.clone())
                        .unwrap_or_else(|| "syntax error".to_string());
                    TestVerdict::new(&path, false, detail)
                }
                Err(e) => TestVerdict::new(&path, false, e.to_string()),
            };
            set.push(verdict);
        }

        tracing::info!(
            scopes = set.verdicts.len(),
            passed = set.all_passed(),
            "import checks complete"
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(files: &[(&str, &str)]) -> SourceIndex {
        let mut index = SourceIndex::new();
        for (path, text) in files {
            index.insert_unit(path.to_string(), text.to_string());
        }
        index
    }

    #[test]
    fn test_import_check_fallback_without_runner() {
        let mut index = index_of(&[("ok.py", "x = 1\n"), ("bad.py", "def broken(:\n")]);
        let oracle = TestOracle::new(TestConfig::default());

        let set = oracle.run(&mut index);

        assert_eq!(set.mode, VerdictMode::ImportCheck);
        assert!(!set.get("bad.py").unwrap().passed);
        assert!(set.get("ok.py").unwrap().passed);
        assert_eq!(set.failing_scopes(), vec!["bad.py".to_string()]);
    }

    #[test]
    fn test_configured_command_success() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = SourceIndex::with_root(dir.path());
        index.insert_unit("a.py", "x = 1\n");

        let oracle = TestOracle::new(TestConfig {
            command: Some("true".to_string()),
            timeout_secs: 5,
        });
        let set = oracle.run(&mut index);

        assert_eq!(set.mode, VerdictMode::Suite);
        assert!(set.all_passed());
    }

    #[test]
    fn test_configured_command_failure() {
        let mut index = index_of(&[("a.py", "x = 1\n")]);
        let oracle = TestOracle::new(TestConfig {
            command: Some("false".to_string()),
            timeout_secs: 5,
        });

        let set = oracle.run(&mut index);

        assert!(!set.all_passed());
        assert_eq!(set.failing_scopes(), vec![SUITE_SCOPE.to_string()]);
    }

    #[test]
    fn test_spawn_failure_is_failing_verdict() {
        let mut index = index_of(&[("a.py", "x = 1\n")]);
        let oracle = TestOracle::new(TestConfig {
            command: Some("definitely-not-a-real-test-runner".to_string()),
            timeout_secs: 5,
        });

        let set = oracle.run(&mut index);

        assert!(!set.all_passed());
        assert!(set.verdicts[0].detail.contains("failed to spawn"));
        assert!(set.verdicts[0].detail.contains("test_run"));
    }

    #[test]
    fn test_timeout_kills_and_fails() {
        let mut index = index_of(&[("a.py", "x = 1\n")]);
        let oracle = TestOracle::new(TestConfig {
            command: Some("sleep 30".to_string()),
            timeout_secs: 0,
        });

        let set = oracle.run(&mut index);

        assert!(!set.all_passed());
        assert!(set.verdicts[0].detail.contains("timed out"));
    }
}
