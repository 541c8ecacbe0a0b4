//! Artifacts handed to the forecasting library
//!
//! The decoded estimator configuration goes to the model directory as
//! canonical JSON with its BLAKE3 hash; the evaluation settings go to the
//! output directory.

use sagecast_hyperparams::{canonical_json_string, config_hash, ConfigNode, Instantiate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{EntrypointError, Result};

pub const ESTIMATOR_FILE: &str = "estimator.json";
pub const ESTIMATOR_HASH_FILE: &str = "estimator.hash";
pub const EVALUATION_FILE: &str = "evaluation.json";
pub const AGG_METRICS_FILE: &str = "agg_metrics.json";
pub const ITEM_METRICS_FILE: &str = "item_metrics.csv";

/// Decoded estimator configuration ready for instantiation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimatorManifest {
    pub algo: String,
    pub created_at: i64,
    pub config_hash: String,
    pub config: ConfigNode,
}

/// Stamps a decoded configuration into an [`EstimatorManifest`].
#[derive(Clone, Debug, Default)]
pub struct ManifestBuilder;

impl Instantiate for ManifestBuilder {
    type Output = EstimatorManifest;
    type Error = EntrypointError;

    fn instantiate(&self, node: &ConfigNode) -> Result<EstimatorManifest> {
        Ok(EstimatorManifest {
            algo: node.class.clone(),
            created_at: chrono::Utc::now().timestamp(),
            config_hash: config_hash(node)?,
            config: node.clone(),
        })
    }
}

/// Where a manifest was written.
#[derive(Clone, Debug)]
pub struct ManifestPaths {
    pub manifest: PathBuf,
    pub hash: PathBuf,
}

/// Write the manifest as canonical JSON plus its configuration hash.
pub fn write_manifest(model_dir: &Path, manifest: &EstimatorManifest) -> Result<ManifestPaths> {
    std::fs::create_dir_all(model_dir)?;

    let manifest_path = model_dir.join(ESTIMATOR_FILE);
    info!("Saving estimator configuration to: {}", manifest_path.display());
    std::fs::write(&manifest_path, canonical_json_string(manifest)?)?;

    let hash_path = model_dir.join(ESTIMATOR_HASH_FILE);
    std::fs::write(&hash_path, &manifest.config_hash)?;

    Ok(ManifestPaths {
        manifest: manifest_path,
        hash: hash_path,
    })
}

pub fn read_manifest(model_dir: &Path) -> Result<EstimatorManifest> {
    let content = std::fs::read_to_string(model_dir.join(ESTIMATOR_FILE))?;
    Ok(serde_json::from_str(&content)?)
}

/// Settings for backtesting the trained predictor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPlan {
    pub num_samples: usize,
    pub quantiles: Vec<f64>,
    pub plot_transparent: bool,
    pub gt_inverse_transform: Option<String>,
    pub clip_at_zero: bool,
    pub num_series: Option<usize>,
    pub agg_metrics_file: String,
    pub item_metrics_file: String,
    pub wmape_file: Option<String>,
}

pub fn write_evaluation_plan(output_dir: &Path, plan: &EvaluationPlan) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(EVALUATION_FILE);
    info!("Saving evaluation plan to: {}", path.display());
    std::fs::write(&path, canonical_json_string(plan)?)?;
    Ok(path)
}
