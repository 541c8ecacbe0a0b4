//! Flat dotted hyperparameters to nested estimator configuration
//!
//! `{"trainer": "pkg.Trainer", "trainer.epochs": 5, "lr": 0.01}` with
//! `trainer` declared as nested becomes an estimator node whose `trainer`
//! kwarg is itself a `pkg.Trainer` node with `epochs = 5`.

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{ConfigNode, ConfigValue};
use crate::errors::Result;
use crate::hyperparameters::{Hyperparameters, NAMESPACE_SEPARATOR};
use crate::registry::EstimatorRegistry;

/// Build a live object out of a decoded configuration.
///
/// Implemented outside this crate by whatever owns the estimator types.
pub trait Instantiate {
    type Output;
    type Error;

    fn instantiate(&self, node: &ConfigNode) -> std::result::Result<Self::Output, Self::Error>;
}

/// Decode the keyword arguments of an estimator.
///
/// Undotted keys become kwargs. Each name in `nested` that is present at the
/// top level turns into a sub-instance whose class is that key's value and
/// whose kwargs are the `"{name}."` entries with the prefix stripped. Absent
/// names are skipped; dotted keys no declared name claims are dropped.
pub fn decode_kwargs<S: AsRef<str>>(
    hp: &Hyperparameters,
    nested: &[S],
) -> BTreeMap<String, ConfigValue> {
    let mut kwargs: BTreeMap<String, ConfigValue> = hp
        .top_level()
        .map(|(key, value)| (key.clone(), ConfigValue::Value(value.clone())))
        .collect();

    for name in nested {
        let name = name.as_ref();
        let Some(ConfigValue::Value(class)) = kwargs.get(name) else {
            continue;
        };

        let class = class.as_str().map(str::to_string).unwrap_or_else(|| class.to_string());
        let child = ConfigNode::with_values(class, hp.with_prefix(name));
        debug!("decoded nested argument {} as {} ({} kwargs)", name, child.class, child.kwargs.len());
        kwargs.insert(name.to_string(), ConfigValue::Instance(child));
    }

    for key in hp.keys().filter(|key| key.contains(NAMESPACE_SEPARATOR)) {
        let claimed = key
            .split_once(NAMESPACE_SEPARATOR)
            .is_some_and(|(head, _)| matches!(kwargs.get(head), Some(ConfigValue::Instance(_))));
        if !claimed {
            debug!("ignoring hyperparameter {}: no nested argument claims it", key);
        }
    }

    kwargs
}

/// Decode `hp` into the configuration of estimator `class`.
///
/// Fails only when `registry` has no entry for `class`.
pub fn decode_estimator(
    hp: &Hyperparameters,
    class: &str,
    registry: &EstimatorRegistry,
) -> Result<ConfigNode> {
    let nested = registry.nested_args(class)?;
    Ok(ConfigNode::new(class, decode_kwargs(hp, nested)))
}
