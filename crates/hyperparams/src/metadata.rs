//! Dataset metadata and its reconciliation with user hyperparameters

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::hyperparameters::Hyperparameters;
use crate::value::HpValue;

pub const FREQ_KEY: &str = "freq";
pub const PREDICTION_LENGTH_KEY: &str = "prediction_length";

/// A named categorical feature and the number of categories it takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalFeatureInfo {
    pub name: String,
    pub cardinality: String,
}

/// A named feature without further description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicFeatureInfo {
    pub name: String,
}

/// Dataset-level description shipped next to the train/test channels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub freq: String,
    #[serde(default)]
    pub prediction_length: Option<u64>,
    #[serde(default)]
    pub target: Option<BasicFeatureInfo>,
    #[serde(default)]
    pub feat_static_cat: Vec<CategoricalFeatureInfo>,
    #[serde(default)]
    pub feat_static_real: Vec<BasicFeatureInfo>,
    #[serde(default)]
    pub feat_dynamic_real: Vec<BasicFeatureInfo>,
    #[serde(default)]
    pub feat_dynamic_cat: Vec<CategoricalFeatureInfo>,
}

impl DatasetMetadata {
    pub fn new(freq: impl Into<String>, prediction_length: Option<u64>) -> Self {
        Self {
            freq: freq.into(),
            prediction_length,
            target: None,
            feat_static_cat: Vec::new(),
            feat_static_real: Vec::new(),
            feat_dynamic_real: Vec::new(),
            feat_dynamic_cat: Vec::new(),
        }
    }

    pub fn has_static_features(&self) -> bool {
        !self.feat_static_cat.is_empty() || !self.feat_static_real.is_empty()
    }
}

/// Resolve the values injected into the estimator: hyperparameter or metadata.
///
/// `freq` always follows the dataset, discarding any caller value.
/// `prediction_length` keeps the caller value and falls back to metadata.
/// Every other key passes through.
pub fn merge_metadata_hp(hp: &Hyperparameters, metadata: &DatasetMetadata) -> Hyperparameters {
    let mut merged = hp.clone();
    let freq = HpValue::String(metadata.freq.clone());

    if let Some(previous) = merged.insert(FREQ_KEY, freq.clone()) {
        if previous != freq {
            warn!(
                "freq: set freq='{}' from metadata; ignore '{}' from hyperparameters",
                metadata.freq, previous
            );
        }
    }

    if !merged.contains_key(PREDICTION_LENGTH_KEY) {
        let prediction_length = match metadata.prediction_length {
            Some(length) => i64::try_from(length)
                .map(HpValue::Int)
                .unwrap_or_else(|_| HpValue::Json(length.into())),
            None => HpValue::Null,
        };
        info!(
            "prediction_length: no hyperparameter, so set prediction_length={} from metadata",
            prediction_length
        );
        merged.insert(PREDICTION_LENGTH_KEY, prediction_length);
    }

    if metadata.has_static_features() {
        warn!("cardinality and static features in the metadata are not probed; pass them as hyperparameters");
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log lines for inspection.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Ok(mut bytes) = self.0.lock() {
                bytes.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Merge under a scoped subscriber and return the result with the log output.
    fn merge_logged(hp: &Hyperparameters, metadata: &DatasetMetadata) -> (Hyperparameters, String) {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let merged = tracing::subscriber::with_default(subscriber, || merge_metadata_hp(hp, metadata));
        (merged, capture.text())
    }

    fn daily() -> DatasetMetadata {
        DatasetMetadata::new("D", Some(7))
    }

    #[test]
    fn test_defaults_from_metadata() {
        let merged = merge_metadata_hp(&Hyperparameters::new(), &daily());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("freq"), Some(&HpValue::String("D".into())));
        assert_eq!(merged.get("prediction_length"), Some(&HpValue::Int(7)));
    }

    #[test]
    fn test_freq_forced_prediction_length_kept() {
        let mut hp = Hyperparameters::new();
        hp.insert("freq", "W");
        hp.insert("prediction_length", 14i64);

        let merged = merge_metadata_hp(&hp, &daily());
        assert_eq!(merged.get("freq"), Some(&HpValue::String("D".into())));
        assert_eq!(merged.get("prediction_length"), Some(&HpValue::Int(14)));
    }

    #[test]
    fn test_other_keys_pass_through() {
        let mut hp = Hyperparameters::new();
        hp.insert("trainer", "pkg.Trainer");
        hp.insert("trainer.epochs", 3i64);

        let merged = merge_metadata_hp(&hp, &daily());
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.get("trainer.epochs"), Some(&HpValue::Int(3)));
        // input is left untouched
        assert_eq!(hp.len(), 2);
    }

    #[test]
    fn test_missing_metadata_prediction_length() {
        let merged = merge_metadata_hp(&Hyperparameters::new(), &DatasetMetadata::new("H", None));
        assert_eq!(merged.get("prediction_length"), Some(&HpValue::Null));
    }

    #[test]
    fn test_metadata_json_layout() -> serde_json::Result<()> {
        let metadata: DatasetMetadata = serde_json::from_str(
            r#"{
                "freq": "1D",
                "prediction_length": 28,
                "feat_static_cat": [{"name": "feat_static_cat", "cardinality": "10"}]
            }"#,
        )?;
        assert_eq!(metadata.freq, "1D");
        assert_eq!(metadata.prediction_length, Some(28));
        assert_eq!(metadata.feat_static_cat[0].cardinality, "10");
        assert!(metadata.has_static_features());
        assert!(metadata.feat_dynamic_real.is_empty());
        Ok(())
    }

    #[test]
    fn test_freq_override_is_warned() {
        let mut hp = Hyperparameters::new();
        hp.insert("freq", "W");
        hp.insert("prediction_length", 14i64);

        let (_, logs) = merge_logged(&hp, &daily());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("freq: set freq='D' from metadata; ignore 'W' from hyperparameters"));
        assert!(!logs.contains("prediction_length: no hyperparameter"));
    }

    #[test]
    fn test_matching_freq_is_silent() {
        let mut hp = Hyperparameters::new();
        hp.insert("freq", "D");
        hp.insert("prediction_length", 14i64);

        let (_, logs) = merge_logged(&hp, &daily());
        assert!(!logs.contains("freq: set freq"));
        assert!(!logs.contains("WARN"));
    }

    #[test]
    fn test_prediction_length_default_is_noted() {
        let (_, logs) = merge_logged(&Hyperparameters::new(), &daily());
        assert!(logs.contains("INFO"));
        assert!(logs.contains("prediction_length: no hyperparameter, so set prediction_length=7 from metadata"));
        // freq was absent, so there was nothing to override
        assert!(!logs.contains("freq: set freq"));
    }

    #[test]
    fn test_static_features_warn_about_cardinality() {
        let mut metadata = daily();
        metadata.feat_static_cat.push(CategoricalFeatureInfo {
            name: "feat_static_cat".into(),
            cardinality: "10".into(),
        });

        let (_, logs) = merge_logged(&Hyperparameters::new(), &metadata);
        assert!(logs.contains("cardinality and static features in the metadata are not probed"));

        let (_, logs) = merge_logged(&Hyperparameters::new(), &daily());
        assert!(!logs.contains("cardinality"));
    }

    #[test]
    fn test_prediction_length_beyond_i64() {
        let merged = merge_metadata_hp(&Hyperparameters::new(), &DatasetMetadata::new("D", Some(u64::MAX)));
        let length = merged.get("prediction_length").cloned().map(serde_json::Value::from);
        assert_eq!(length, Some(serde_json::json!(u64::MAX)));
    }
}
