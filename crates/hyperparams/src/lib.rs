//! Sagecast hyperparameters - estimator configuration decoding
//!
//! Turns the flat `--name value` hyperparameters of a training job into a
//! nested, typed estimator configuration, reconciled with the dataset's
//! own metadata.

pub mod config;
pub mod decoder;
pub mod errors;
pub mod hyperparameters;
pub mod metadata;
pub mod parser;
pub mod registry;
pub mod serialization;
pub mod value;

pub use config::{ConfigNode, ConfigValue, NodeKind};
pub use decoder::{decode_estimator, decode_kwargs, Instantiate};
pub use errors::{HyperparamError, Result};
pub use hyperparameters::{Hyperparameters, NAMESPACE_SEPARATOR};
pub use metadata::{merge_metadata_hp, DatasetMetadata};
pub use parser::{parse_hyperparameters, raw_arguments, RawArgument};
pub use registry::EstimatorRegistry;
pub use serialization::{canonical_json_string, config_hash};
pub use value::{infer_dtype, HpValue};

/// Parse command-line tokens, reconcile them with `metadata` and decode
/// the configuration of estimator `class`.
pub fn estimator_config_from_args<I, S>(
    tokens: I,
    class: &str,
    metadata: &DatasetMetadata,
    registry: &EstimatorRegistry,
) -> Result<ConfigNode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let hp = merge_metadata_hp(&parse_hyperparameters(tokens), metadata);
    decode_estimator(&hp, class, registry)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
