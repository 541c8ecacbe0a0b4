//! One training job, from arguments to artifacts

use sagecast_hyperparams::{
    decode_estimator, merge_metadata_hp, ConfigNode, ConfigValue, EstimatorRegistry, Instantiate,
};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::artifacts::{
    write_evaluation_plan, write_manifest, EvaluationPlan, ManifestBuilder, AGG_METRICS_FILE,
    ITEM_METRICS_FILE,
};
use crate::cli::{Args, StopBefore};
use crate::dataset::{Dataset, DatasetSource};
use crate::errors::Result;
use crate::freq::freq_name;
use crate::transform;

/// What a run decoded and wrote.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub config: ConfigNode,
    pub stopped_before: Option<StopBefore>,
    pub manifest_path: Option<PathBuf>,
    pub transform_path: Option<PathBuf>,
    pub evaluation_path: Option<PathBuf>,
}

/// Builtin estimator families plus any registered from `args.registry`.
pub fn load_registry(args: &Args) -> Result<EstimatorRegistry> {
    let mut registry = EstimatorRegistry::builtin();
    if let Some(path) = &args.registry {
        info!("Registering estimator families from {}", path.display());
        registry.merge(EstimatorRegistry::from_toml_file(path)?);
    }
    Ok(registry)
}

/// Decode the estimator for a job and write what the library needs to train it.
///
/// `hp_tokens` are the `--name value` tokens no entrypoint option claimed.
pub fn run<S: AsRef<str>>(args: &Args, hp_tokens: &[S]) -> Result<RunReport> {
    let registry = load_registry(args)?;

    let source = DatasetSource::resolve(
        args.s3_dataset.as_deref(),
        &args.dataset,
        args.dataset_root.as_deref(),
    )?;
    let dataset = Dataset::open(&source)?;
    info!(
        "Dataset: freq={}, train series={:?}, test series={:?}",
        dataset.metadata.freq, dataset.train_series, dataset.test_series
    );

    let hp = merge_metadata_hp(&args.hyperparameters(hp_tokens), &dataset.metadata);
    let config = decode_estimator(&hp, &args.algo, &registry)?;
    log_estimator(&config);

    let mut report = RunReport {
        config,
        stopped_before: None,
        manifest_path: None,
        transform_path: None,
        evaluation_path: None,
    };

    if args.stop_before == Some(StopBefore::Train) {
        info!("Early termination: before train");
        report.stopped_before = Some(StopBefore::Train);
        return Ok(report);
    }

    let manifest = ManifestBuilder.instantiate(&report.config)?;
    let paths = write_manifest(&args.model_dir, &manifest)?;
    report.manifest_path = Some(paths.manifest);
    report.transform_path = Some(transform::write_record(&args.model_dir, args.y_transform)?);

    if args.stop_before == Some(StopBefore::Eval) {
        info!("Early termination: before eval");
        report.stopped_before = Some(StopBefore::Eval);
        return Ok(report);
    }

    let wmape_file = match freq_name(&dataset.metadata.freq) {
        Ok(name) => Some(name.wmape_file_name()),
        Err(err) => {
            warn!("skipping wMAPE output: {}", err);
            None
        }
    };

    let plan = EvaluationPlan {
        num_samples: args.num_samples,
        quantiles: args.quantiles.0.clone(),
        plot_transparent: args.plot_transparent != 0,
        gt_inverse_transform: args.y_transform.ground_truth_inverse().map(str::to_string),
        clip_at_zero: true,
        num_series: dataset.test_series,
        agg_metrics_file: AGG_METRICS_FILE.to_string(),
        item_metrics_file: ITEM_METRICS_FILE.to_string(),
        wmape_file,
    };
    report.evaluation_path = Some(write_evaluation_plan(&args.output_data_dir, &plan)?);

    Ok(report)
}

fn log_estimator(config: &ConfigNode) {
    info!("Estimator: {}", config.class);
    for (name, value) in &config.kwargs {
        match value {
            ConfigValue::Instance(child) => {
                info!("  {}: {} ({} kwargs)", name, child.class, child.kwargs.len())
            }
            ConfigValue::Value(value) => info!("  {}: {}", name, value),
        }
    }
}
