use sagecast_hyperparams::HyperparamError;
use thiserror::Error;

/// Errors returned by the training entrypoint.
#[derive(Debug, Error)]
pub enum EntrypointError {
    #[error("hyperparameter error: {0}")]
    Hyperparams(#[from] HyperparamError),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for entrypoint operations
pub type Result<T> = std::result::Result<T, EntrypointError>;
