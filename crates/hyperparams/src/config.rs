//! Deferred constructor calls
//!
//! A [`ConfigNode`] names a class and the keyword arguments to build it
//! with. Serialized, it uses the `{"__kind__": "instance", ...}` layout the
//! forecasting library decodes into live objects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::hyperparameters::{Hyperparameters, NAMESPACE_SEPARATOR};
use crate::value::HpValue;

/// Marker telling the consumer to instantiate the node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    #[serde(rename = "instance")]
    Instance,
}

/// A keyword argument: either a nested instance or a plain value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Instance(ConfigNode),
    Value(HpValue),
}

impl ConfigValue {
    pub fn as_instance(&self) -> Option<&ConfigNode> {
        match self {
            ConfigValue::Instance(node) => Some(node),
            ConfigValue::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&HpValue> {
        match self {
            ConfigValue::Value(value) => Some(value),
            ConfigValue::Instance(_) => None,
        }
    }
}

impl From<HpValue> for ConfigValue {
    fn from(value: HpValue) -> Self {
        ConfigValue::Value(value)
    }
}

impl From<ConfigNode> for ConfigValue {
    fn from(node: ConfigNode) -> Self {
        ConfigValue::Instance(node)
    }
}

/// A class plus the arguments to construct it with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigNode {
    #[serde(rename = "__kind__")]
    pub kind: NodeKind,
    pub class: String,
    #[serde(default)]
    pub args: Vec<ConfigValue>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, ConfigValue>,
}

impl ConfigNode {
    /// A node with no positional arguments.
    pub fn new(class: impl Into<String>, kwargs: BTreeMap<String, ConfigValue>) -> Self {
        Self {
            kind: NodeKind::Instance,
            class: class.into(),
            args: Vec::new(),
            kwargs,
        }
    }

    /// A node whose keyword arguments are all plain values.
    pub fn with_values(class: impl Into<String>, values: BTreeMap<String, HpValue>) -> Self {
        Self::new(
            class,
            values
                .into_iter()
                .map(|(key, value)| (key, ConfigValue::Value(value)))
                .collect(),
        )
    }

    pub fn kwarg(&self, name: &str) -> Option<&ConfigValue> {
        self.kwargs.get(name)
    }

    /// Re-flatten the keyword arguments into dotted hyperparameters.
    ///
    /// A nested instance contributes its class name under its own key and
    /// its kwargs under `"{key}.{kwarg}"`.
    pub fn flatten(&self) -> Hyperparameters {
        let mut hp = Hyperparameters::new();
        for (key, value) in &self.kwargs {
            match value {
                ConfigValue::Value(value) => {
                    hp.insert(key.clone(), value.clone());
                }
                ConfigValue::Instance(child) => {
                    hp.insert(key.clone(), HpValue::String(child.class.clone()));
                    for (child_key, child_value) in child.flatten() {
                        hp.insert(
                            format!("{}{}{}", key, NAMESPACE_SEPARATOR, child_key),
                            child_value,
                        );
                    }
                }
            }
        }
        hp
    }
}
