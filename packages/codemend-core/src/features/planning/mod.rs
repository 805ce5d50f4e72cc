//! Planning: patch plan model and the fix planner

pub mod plan;
pub mod planner;

pub use plan::{notes, OperationKind, OperationStatus, PatchOperation, PatchPlan, ReportOnly};
pub use planner::FixPlanner;
