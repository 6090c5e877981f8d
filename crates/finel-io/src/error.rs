use finel_core::FemError;
use thiserror::Error;

/// Errors raised while persisting or reloading engine artifacts.
#[derive(Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// A reloaded document failed model-level validation.
    #[error(transparent)]
    Model(#[from] FemError),
}
