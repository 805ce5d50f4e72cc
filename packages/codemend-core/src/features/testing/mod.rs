//! Testing: verdict model and the test oracle

pub mod oracle;
pub mod verdict;

pub use oracle::TestOracle;
pub use verdict::{regressions, TestVerdict, TestVerdictSet, VerdictMode};
