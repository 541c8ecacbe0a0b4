//! Flat hyperparameter mapping keyed by dot-qualified names

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::value::HpValue;

/// Separator between a nested argument name and its own keyword arguments.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Flat hyperparameters, e.g. `{"lr": 0.01, "trainer.epochs": 5}`.
///
/// Keys are kept sorted so iteration and serialization are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hyperparameters {
    values: BTreeMap<String, HpValue>,
}

impl Hyperparameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the JSON object SageMaker exports as `SM_HPS`.
    ///
    /// String values are inferred like command-line tokens; everything else
    /// already carries a JSON type.
    pub fn from_json_object(object: Map<String, Value>) -> Self {
        object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(text) => crate::value::infer_dtype(&text),
                    other => HpValue::from(other),
                };
                (key, value)
            })
            .collect()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<HpValue>) -> Option<HpValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&HpValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<HpValue> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HpValue)> {
        self.values.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Overlay `other` on top of `self`; keys from `other` win.
    pub fn extend(&mut self, other: Hyperparameters) {
        self.values.extend(other.values);
    }

    /// Entries whose key carries no namespace separator.
    pub fn top_level(&self) -> impl Iterator<Item = (&String, &HpValue)> {
        self.values
            .iter()
            .filter(|(key, _)| !key.contains(NAMESPACE_SEPARATOR))
    }

    /// Entries under `"{prefix}."`, with the prefix stripped.
    pub fn with_prefix(&self, prefix: &str) -> BTreeMap<String, HpValue> {
        let prefix = format!("{}{}", prefix, NAMESPACE_SEPARATOR);
        self.values
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix.as_str())
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, HpValue> {
        self.values
    }
}

impl FromIterator<(String, HpValue)> for Hyperparameters {
    fn from_iter<I: IntoIterator<Item = (String, HpValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Hyperparameters {
    type Item = (String, HpValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, HpValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl From<BTreeMap<String, HpValue>> for Hyperparameters {
    fn from(values: BTreeMap<String, HpValue>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Hyperparameters {
        let mut hp = Hyperparameters::new();
        hp.insert("trainer", "pkg.Trainer");
        hp.insert("trainer.epochs", 5i64);
        hp.insert("trainer.learning_rate", 0.001);
        hp.insert("trainerx.epochs", 9i64);
        hp.insert("lr", 0.01);
        hp
    }

    #[test]
    fn test_top_level_excludes_dotted_keys() {
        let hp = sample();
        let keys: Vec<&String> = hp.top_level().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["lr", "trainer"]);
    }

    #[test]
    fn test_with_prefix_matches_whole_segment() {
        let hp = sample();
        let nested = hp.with_prefix("trainer");
        assert_eq!(nested.len(), 2);
        assert_eq!(nested.get("epochs"), Some(&HpValue::Int(5)));
        assert_eq!(nested.get("learning_rate"), Some(&HpValue::Float(0.001)));
    }

    #[test]
    fn test_from_json_object_infers_strings() {
        let object = json!({
            "epochs": "10",
            "lr": 0.5,
            "algo": "pkg.Estimator",
            "quantiles": "[0.1, 0.9]"
        });
        let Value::Object(map) = object else {
            panic!("expected object");
        };
        let hp = Hyperparameters::from_json_object(map);

        assert_eq!(hp.get("epochs"), Some(&HpValue::Int(10)));
        assert_eq!(hp.get("lr"), Some(&HpValue::Float(0.5)));
        assert_eq!(hp.get("algo"), Some(&HpValue::String("pkg.Estimator".into())));
        assert_eq!(hp.get("quantiles"), Some(&HpValue::Json(json!([0.1, 0.9]))));
    }

    #[test]
    fn test_extend_overrides() {
        let mut base = Hyperparameters::new();
        base.insert("epochs", 1i64);
        base.insert("lr", 0.1);

        let mut overlay = Hyperparameters::new();
        overlay.insert("epochs", 7i64);

        base.extend(overlay);
        assert_eq!(base.get("epochs"), Some(&HpValue::Int(7)));
        assert_eq!(base.get("lr"), Some(&HpValue::Float(0.1)));
    }

    #[test]
    fn test_serializes_as_plain_object() -> serde_json::Result<()> {
        let hp = sample();
        let value = serde_json::to_value(&hp)?;
        assert_eq!(value["trainer.epochs"], json!(5));
        assert_eq!(value["trainer"], json!("pkg.Trainer"));
        Ok(())
    }
}
