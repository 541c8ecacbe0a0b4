//! SageMaker argument protocol
//!
//! SageMaker hands a training job its channels and directories through
//! `SM_*` environment variables and its hyperparameters as `--name value`
//! pairs. Options this entrypoint knows are parsed by clap; everything else
//! is forwarded to the estimator as hyperparameters.

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use sagecast_hyperparams::{infer_dtype, parse_hyperparameters, registry, Hyperparameters};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::transform::YTransform;

pub const DEFAULT_QUANTILES: &str = "[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]";

/// Milestones a run can stop before, for debugging a job configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StopBefore {
    Train,
    Eval,
}

/// Quantile levels evaluated on the forecasts.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantiles(pub Vec<f64>);

/// Hyperparameters SageMaker exports as a JSON object in `SM_HPS`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmHps(pub Map<String, Value>);

#[derive(Parser, Debug, Clone)]
#[command(name = "sagecast-train")]
#[command(author = "Sagecast Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decode forecasting estimator hyperparameters for a training job", long_about = None)]
pub struct Args {
    /// Output directory for the estimator configuration and transform record
    #[arg(long, alias = "model_dir", env = "SM_MODEL_DIR", default_value = "model")]
    pub model_dir: PathBuf,

    /// Output directory for the evaluation plan
    #[arg(long, alias = "output_data_dir", env = "SM_OUTPUT_DATA_DIR", default_value = "output")]
    pub output_data_dir: PathBuf,

    /// Custom dataset directory (metadata, train and test channels)
    #[arg(long, alias = "s3_dataset", env = "SM_CHANNEL_S3_DATASET")]
    pub s3_dataset: Option<PathBuf>,

    /// Name of a dataset under the dataset root, used without --s3-dataset
    #[arg(long, env = "SM_HP_DATASET", default_value = "")]
    pub dataset: String,

    /// Root directory of named datasets
    #[arg(long, alias = "dataset_root", env = "SAGECAST_DATASET_ROOT")]
    pub dataset_root: Option<PathBuf>,

    /// Number of sample paths drawn per series during evaluation
    #[arg(long, alias = "num_samples", env = "SM_HP_NUM_SAMPLES", default_value = "1000")]
    pub num_samples: usize,

    /// Quantile levels as a JSON list
    #[arg(long, env = "SM_HP_QUANTILES", default_value = DEFAULT_QUANTILES, value_parser = parse_quantiles)]
    pub quantiles: Quantiles,

    /// Fully-qualified estimator class
    #[arg(long, env = "SM_HP_ALGO", default_value = registry::DEEPAR)]
    pub algo: String,

    /// Transformation applied to the target before training
    #[arg(long, alias = "y_transform", value_enum, default_value = "noop")]
    pub y_transform: YTransform,

    /// Render plots with a transparent background (0 or 1)
    #[arg(long, alias = "plot_transparent", env = "SM_HP_PLOT_TRANSPARENT", default_value = "0")]
    pub plot_transparent: i64,

    /// Stop before the given milestone
    #[arg(long, alias = "stop_before", value_enum)]
    pub stop_before: Option<StopBefore>,

    /// Hyperparameters as a JSON object; command-line values take precedence
    #[arg(long, alias = "sm_hps", env = "SM_HPS", value_parser = parse_sm_hps)]
    pub sm_hps: Option<SmHps>,

    /// TOML file registering additional estimator families
    #[arg(long, env = "SAGECAST_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Names of the options this entrypoint consumes itself, underscore spelled.
    pub fn option_names() -> BTreeSet<String> {
        Args::command()
            .get_arguments()
            .map(|arg| arg.get_id().as_str().replace('-', "_"))
            .collect()
    }

    /// Estimator hyperparameters: `SM_HPS` overlaid with the forwarded tokens.
    ///
    /// Keys naming one of this entrypoint's own options are dropped from
    /// `SM_HPS`, since SageMaker lists every hyperparameter there.
    pub fn hyperparameters<S: AsRef<str>>(&self, tokens: &[S]) -> Hyperparameters {
        let mut hp = match &self.sm_hps {
            Some(SmHps(object)) => Hyperparameters::from_json_object(object.clone()),
            None => Hyperparameters::new(),
        };
        for name in Self::option_names() {
            hp.remove(&name);
        }

        hp.extend(parse_hyperparameters(tokens));
        hp
    }
}

fn parse_quantiles(text: &str) -> Result<Quantiles, String> {
    infer_dtype(text)
        .as_f64_list()
        .map(Quantiles)
        .ok_or_else(|| format!("expected a JSON list of numbers, got '{}'", text))
}

fn parse_sm_hps(text: &str) -> Result<SmHps, String> {
    serde_json::from_str::<Map<String, Value>>(text)
        .map(SmHps)
        .map_err(|err| format!("expected a JSON object: {}", err))
}

/// Split `argv` into the tokens clap should parse and the rest.
///
/// The first token (program name) and every known option, with its value,
/// stay with clap. Unknown tokens keep their order; an unknown
/// `--name=value` is split into two tokens.
pub fn split_known_args<I, S>(argv: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut command = Args::command();
    command.build();

    let mut takes_value: Vec<(String, bool)> = Vec::new();
    for arg in command.get_arguments() {
        let needs_value = !matches!(
            arg.get_action(),
            ArgAction::SetTrue
                | ArgAction::SetFalse
                | ArgAction::Count
                | ArgAction::Help
                | ArgAction::HelpShort
                | ArgAction::HelpLong
                | ArgAction::Version
        );
        if let Some(long) = arg.get_long() {
            takes_value.push((format!("--{}", long), needs_value));
        }
        for alias in arg.get_all_aliases().into_iter().flatten() {
            takes_value.push((format!("--{}", alias), needs_value));
        }
        if let Some(short) = arg.get_short() {
            takes_value.push((format!("-{}", short), needs_value));
        }
    }
    let lookup = |flag: &str| {
        takes_value
            .iter()
            .find(|(name, _)| name == flag)
            .map(|(_, needs_value)| *needs_value)
    };

    let mut it = argv.into_iter().map(Into::into);
    let mut known: Vec<String> = it.next().into_iter().collect();
    let mut unknown = Vec::new();

    while let Some(token) = it.next() {
        let (flag, inline_value) = match token.split_once('=') {
            Some((flag, value)) if flag.starts_with('-') => (flag.to_string(), Some(value.to_string())),
            _ => (token.clone(), None),
        };

        match lookup(&flag) {
            Some(needs_value) => {
                known.push(token);
                if needs_value && inline_value.is_none() {
                    known.extend(it.next());
                }
            }
            None => match inline_value {
                Some(value) => {
                    unknown.push(flag);
                    unknown.push(value);
                }
                None => unknown.push(token),
            },
        }
    }

    (known, unknown)
}
