use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Empty source index: no matching files under {0}")]
    EmptyIndex(String),

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: codemend_core::CodemendError,
    },

    #[error("Core error: {0}")]
    Core(#[from] codemend_core::CodemendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn stage_failed(stage: impl Into<String>, source: codemend_core::CodemendError) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            source,
        }
    }
}
