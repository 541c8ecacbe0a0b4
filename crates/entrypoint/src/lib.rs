//! Sagecast entrypoint - SageMaker-style training job glue
//!
//! Resolves the dataset, reconciles the job's hyperparameters with the
//! dataset metadata and writes the decoded estimator configuration for the
//! forecasting library to train.

pub mod artifacts;
pub mod cli;
pub mod dataset;
pub mod errors;
pub mod freq;
pub mod run;
pub mod transform;

pub use artifacts::{EstimatorManifest, EvaluationPlan, ManifestBuilder};
pub use cli::{split_known_args, Args, StopBefore};
pub use dataset::{Dataset, DatasetSource};
pub use errors::{EntrypointError, Result};
pub use freq::{freq_name, FreqName};
pub use run::{run, RunReport};
pub use transform::YTransform;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
