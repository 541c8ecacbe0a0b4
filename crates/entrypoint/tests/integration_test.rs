//! Integration tests for the training entrypoint
//!
//! Runs whole jobs against a temporary dataset directory and checks the
//! artifacts left in the model and output directories.

use anyhow::Result;
use clap::Parser;
use sagecast_entrypoint::artifacts::{read_manifest, ESTIMATOR_FILE, EVALUATION_FILE};
use sagecast_entrypoint::transform::{read_record, TRANSFORM_FILE};
use sagecast_entrypoint::{run, split_known_args, Args, EvaluationPlan, StopBefore, YTransform};
use sagecast_hyperparams::{ConfigValue, HpValue};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a daily dataset with nested metadata and two test series
fn create_dataset(root: &Path) -> Result<()> {
    fs::create_dir_all(root.join("metadata"))?;
    fs::write(
        root.join("metadata").join("metadata.json"),
        r#"{"freq": "D", "prediction_length": 7}"#,
    )?;

    for channel in ["train", "test"] {
        fs::create_dir_all(root.join(channel))?;
        fs::write(
            root.join(channel).join("data.json"),
            "{\"start\": \"2020-01-01\", \"target\": [1, 2, 3], \"item_id\": \"a\"}\n\
             {\"start\": \"2020-01-01\", \"target\": [4, 5, 6], \"item_id\": \"b\"}\n",
        )?;
    }
    Ok(())
}

fn job_args(work: &Path, extra: &[&str]) -> (Args, Vec<String>) {
    let mut argv: Vec<String> = vec![
        "sagecast-train".to_string(),
        "--s3_dataset".to_string(),
        work.join("dataset").display().to_string(),
        "--model_dir".to_string(),
        work.join("model").display().to_string(),
        "--output_data_dir".to_string(),
        work.join("output").display().to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));

    let (known, unknown) = split_known_args(argv);
    (Args::parse_from(known), unknown)
}

#[test]
fn test_full_job_writes_artifacts() -> Result<()> {
    let work = TempDir::new()?;
    create_dataset(&work.path().join("dataset"))?;

    let (args, tokens) = job_args(
        work.path(),
        &[
            "--algo",
            "gluonts.model.deepar.DeepAREstimator",
            "--y_transform",
            "log1p",
            "--freq",
            "W",
            "--trainer",
            "gluonts.mx.trainer.Trainer",
            "--trainer.epochs",
            "5",
            "--num_samples",
            "200",
        ],
    );
    let report = run(&args, &tokens)?;
    assert!(report.stopped_before.is_none());

    let manifest = read_manifest(&work.path().join("model"))?;
    assert_eq!(manifest.algo, "gluonts.model.deepar.DeepAREstimator");
    assert_eq!(manifest.config, report.config);

    let kwargs = &manifest.config.kwargs;
    assert_eq!(kwargs.get("freq"), Some(&ConfigValue::Value(HpValue::String("D".into()))));
    assert_eq!(kwargs.get("prediction_length"), Some(&ConfigValue::Value(HpValue::Int(7))));
    let trainer = kwargs
        .get("trainer")
        .and_then(ConfigValue::as_instance)
        .expect("trainer instance");
    assert_eq!(trainer.kwarg("epochs"), Some(&ConfigValue::Value(HpValue::Int(5))));
    assert!(!kwargs.contains_key("num_samples"));

    assert_eq!(read_record(&work.path().join("model"))?, YTransform::Log1p);

    let plan: EvaluationPlan = serde_json::from_str(&fs::read_to_string(
        work.path().join("output").join(EVALUATION_FILE),
    )?)?;
    assert_eq!(plan.num_samples, 200);
    assert_eq!(plan.quantiles.len(), 9);
    assert_eq!(plan.num_series, Some(2));
    assert_eq!(plan.gt_inverse_transform.as_deref(), Some("expm1"));
    assert_eq!(plan.wmape_file.as_deref(), Some("daily-wmapes.csv"));
    assert!(plan.clip_at_zero);

    Ok(())
}

#[test]
fn test_stop_before_train_writes_nothing() -> Result<()> {
    let work = TempDir::new()?;
    create_dataset(&work.path().join("dataset"))?;

    let (args, tokens) = job_args(work.path(), &["--stop_before", "train", "--context_length", "14"]);
    let report = run(&args, &tokens)?;

    assert_eq!(report.stopped_before, Some(StopBefore::Train));
    assert_eq!(
        report.config.kwarg("context_length"),
        Some(&ConfigValue::Value(HpValue::Int(14)))
    );
    assert!(!work.path().join("model").exists());
    assert!(!work.path().join("output").exists());
    Ok(())
}

#[test]
fn test_stop_before_eval_skips_plan() -> Result<()> {
    let work = TempDir::new()?;
    create_dataset(&work.path().join("dataset"))?;

    let (args, tokens) = job_args(work.path(), &["--stop_before", "eval"]);
    let report = run(&args, &tokens)?;

    assert_eq!(report.stopped_before, Some(StopBefore::Eval));
    assert!(work.path().join("model").join(ESTIMATOR_FILE).is_file());
    assert!(work.path().join("model").join(TRANSFORM_FILE).is_file());
    assert!(!work.path().join("output").join(EVALUATION_FILE).exists());
    Ok(())
}

#[test]
fn test_unknown_algo_fails() -> Result<()> {
    let work = TempDir::new()?;
    create_dataset(&work.path().join("dataset"))?;

    let (args, tokens) = job_args(work.path(), &["--algo", "pkg.NotAnEstimator"]);
    let err = run(&args, &tokens).unwrap_err();

    assert!(err.to_string().contains("unknown estimator class: pkg.NotAnEstimator"));
    Ok(())
}

#[test]
fn test_registry_extension_file() -> Result<()> {
    let work = TempDir::new()?;
    create_dataset(&work.path().join("dataset"))?;

    let registry_path = work.path().join("registry.toml");
    fs::write(
        &registry_path,
        "[estimators.\"my_pkg.SeasonalEstimator\"]\nnested = [\"season\"]\n",
    )?;

    let registry_arg = registry_path.display().to_string();
    let (args, tokens) = job_args(
        work.path(),
        &[
            "--registry",
            registry_arg.as_str(),
            "--algo",
            "my_pkg.SeasonalEstimator",
            "--season",
            "my_pkg.Weekly",
            "--season.period",
            "7",
            "--stop_before",
            "train",
        ],
    );
    let report = run(&args, &tokens)?;

    let season = report
        .config
        .kwarg("season")
        .and_then(ConfigValue::as_instance)
        .expect("season instance");
    assert_eq!(season.class, "my_pkg.Weekly");
    assert_eq!(season.kwarg("period"), Some(&ConfigValue::Value(HpValue::Int(7))));
    Ok(())
}
