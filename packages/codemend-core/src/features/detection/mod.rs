//! Detection: rule trait, built-in rules, and the detector registry

pub mod detector;
pub mod oversized_function;
pub mod rule;
pub mod unsafe_construct;

pub use detector::IssueDetector;
pub use oversized_function::OversizedFunctionRule;
pub use rule::DetectionRule;
pub use unsafe_construct::UnsafeConstructRule;
