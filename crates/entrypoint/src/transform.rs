//! Target transformation bookkeeping
//!
//! A model trained on `log1p` targets must have its forecasts mapped back
//! with `expm1` before they are compared to ground truth. The pairing is
//! recorded next to the model so inference can restore it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::Result;

pub const TRANSFORM_FILE: &str = "y_transform.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YTransform {
    #[default]
    #[value(name = "noop")]
    Noop,
    #[value(name = "log1p")]
    Log1p,
}

/// On-disk pairing of forward and inverse transformation names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YTransformRecord {
    pub transform: String,
    pub inverse_transform: String,
}

impl YTransform {
    pub fn record(self) -> YTransformRecord {
        let (transform, inverse_transform) = match self {
            YTransform::Log1p => ("log1p", "expm1"),
            YTransform::Noop => ("noop", "clip_at_zero"),
        };
        YTransformRecord {
            transform: transform.to_string(),
            inverse_transform: inverse_transform.to_string(),
        }
    }

    /// Inverse applied to ground truth before computing metrics, if any.
    ///
    /// Ground truth is assumed non-negative, so it is never clipped.
    pub fn ground_truth_inverse(self) -> Option<&'static str> {
        match self {
            YTransform::Log1p => Some("expm1"),
            YTransform::Noop => None,
        }
    }

    /// Transform target values in place before training.
    pub fn forward(self, values: &mut [f64]) {
        if self == YTransform::Log1p {
            for value in values.iter_mut() {
                *value = value.ln_1p();
            }
        }
    }

    /// Map forecasts back to the original scale, clipped at zero.
    pub fn inverse(self, values: &mut [f64]) {
        for value in values.iter_mut() {
            if self == YTransform::Log1p {
                *value = value.exp_m1();
            }
            // NaN stays NaN
            if *value < 0.0 {
                *value = 0.0;
            }
        }
    }
}

impl From<&YTransformRecord> for YTransform {
    fn from(record: &YTransformRecord) -> Self {
        if record.inverse_transform == "expm1" {
            YTransform::Log1p
        } else {
            YTransform::Noop
        }
    }
}

/// Write the transformation record into `model_dir`.
pub fn write_record(model_dir: &Path, transform: YTransform) -> Result<PathBuf> {
    let path = model_dir.join(TRANSFORM_FILE);
    let mut content = serde_json::to_string(&transform.record())?;
    content.push('\n');
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Read the transformation a model in `model_dir` was trained with.
pub fn read_record(model_dir: &Path) -> Result<YTransform> {
    let content = std::fs::read_to_string(model_dir.join(TRANSFORM_FILE))?;
    let record: YTransformRecord = serde_json::from_str(&content)?;
    tracing::info!("custom transformations = {:?}", record);
    Ok(YTransform::from(&record))
}
