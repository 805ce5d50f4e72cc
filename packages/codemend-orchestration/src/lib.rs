//! codemend-orchestration: run state machine, sequential pipeline, and the
//! `codemend` CLI binary over the codemend-core engine.

pub mod error;
pub mod orchestrator;
pub mod result;
pub mod state;

pub use error::{PipelineError, Result};
pub use orchestrator::PipelineOrchestrator;
pub use result::{PipelineResult, RunStats};
pub use state::{PipelineRunState, RunStage};
