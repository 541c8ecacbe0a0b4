//! Estimator registry: which constructor arguments are nested objects
//!
//! Only names listed here are ever decoded into sub-instances; the class
//! names supplied on the command line are never inspected.
//!
//! Deployments can extend the builtin table with a TOML file:
//!
//! ```toml
//! [estimators."my_pkg.MyEstimator"]
//! nested = ["trainer", "distr_output"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{HyperparamError, Result};

pub const DEEPAR: &str = "gluonts.model.deepar.DeepAREstimator";
pub const DEEPSTATE: &str = "gluonts.model.deepstate.DeepStateEstimator";
pub const DEEP_FACTOR: &str = "gluonts.model.deep_factor.DeepFactorEstimator";
pub const TRANSFORMER: &str = "gluonts.model.transformer.TransformerEstimator";
pub const GAUSSIAN_PROCESS: &str = "gluonts.model.gp_forecaster.GaussianProcessEstimator";
pub const NPTS: &str = "gluonts.model.npts.NPTSEstimator";

/// Nested arguments declared for a single estimator class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorFamily {
    #[serde(default)]
    pub nested: Vec<String>,
}

/// Static table from estimator class name to its nested argument names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorRegistry {
    #[serde(default)]
    estimators: BTreeMap<String, EstimatorFamily>,
}

impl EstimatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The estimator families supported out of the box.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(DEEPAR, ["trainer", "distr_output"]);
        registry.register(
            DEEPSTATE,
            [
                "trainer",
                "issm",
                "noise_std_bounds",
                "prior_cov_bounds",
                "innovation_bounds",
            ],
        );
        registry.register(DEEP_FACTOR, ["trainer", "distr_output"]);
        registry.register(TRANSFORMER, ["trainer", "distr_output"]);
        registry.register(GAUSSIAN_PROCESS, ["trainer", "kernel_output"]);
        // NPTS takes kernel_type as a plain string, nothing to nest
        registry.register(NPTS, [] as [&str; 0]);
        registry
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| HyperparamError::Registry(err.to_string()))
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Declare (or replace) the nested arguments of `class`.
    pub fn register<I, S>(&mut self, class: impl Into<String>, nested: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.estimators.insert(
            class.into(),
            EstimatorFamily {
                nested: nested.into_iter().map(Into::into).collect(),
            },
        );
    }

    /// Add every family from `other`, replacing entries with the same class.
    pub fn merge(&mut self, other: EstimatorRegistry) {
        self.estimators.extend(other.estimators);
    }

    /// Nested argument names declared for `class`.
    pub fn nested_args(&self, class: &str) -> Result<&[String]> {
        self.estimators
            .get(class)
            .map(|family| family.nested.as_slice())
            .ok_or_else(|| HyperparamError::UnknownEstimator(class.to_string()))
    }

    pub fn contains(&self, class: &str) -> bool {
        self.estimators.contains_key(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &String> {
        self.estimators.keys()
    }

    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }
}
