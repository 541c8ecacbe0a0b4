use thiserror::Error;

/// Errors returned while decoding estimator hyperparameters.
#[derive(Debug, Error)]
pub enum HyperparamError {
    #[error("unknown estimator class: {0}")]
    UnknownEstimator(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for hyperparameter operations
pub type Result<T> = std::result::Result<T, HyperparamError>;
