//! Dataset directory resolution and metadata loading
//!
//! A dataset directory holds `metadata.json` (either directly or under
//! `metadata/`) and JSON-lines `train/` and `test/` channels. The series
//! themselves are read by the forecasting library; here they are only
//! counted.

use sagecast_hyperparams::DatasetMetadata;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{EntrypointError, Result};

pub const METADATA_FILE: &str = "metadata.json";
pub const TRAIN_CHANNEL: &str = "train";
pub const TEST_CHANNEL: &str = "test";

/// Where a run reads its dataset from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    /// A directory delivered as a training channel
    Local(PathBuf),
    /// A named dataset under the dataset root
    Named { name: String, path: PathBuf },
}

impl DatasetSource {
    /// Pick the dataset for a run: an explicit directory wins over a name.
    pub fn resolve(s3_dataset: Option<&Path>, name: &str, root: Option<&Path>) -> Result<Self> {
        if let Some(dir) = s3_dataset {
            return Ok(DatasetSource::Local(dir.to_path_buf()));
        }

        if name.is_empty() {
            return Err(EntrypointError::Dataset(
                "no dataset given: set --s3-dataset or --dataset".to_string(),
            ));
        }

        let root = match root {
            Some(root) => root.to_path_buf(),
            None => default_dataset_root().ok_or_else(|| {
                EntrypointError::Dataset("cannot locate home directory for dataset root".to_string())
            })?,
        };

        Ok(DatasetSource::Named {
            name: name.to_string(),
            path: root.join(name),
        })
    }

    pub fn path(&self) -> &Path {
        match self {
            DatasetSource::Local(path) => path,
            DatasetSource::Named { path, .. } => path,
        }
    }
}

/// Default location of named datasets, shared with the forecasting library.
pub fn default_dataset_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mxnet").join("gluon-ts").join("datasets"))
}

/// Metadata and channel sizes of a dataset directory.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub root: PathBuf,
    pub metadata: DatasetMetadata,
    pub train_series: Option<usize>,
    pub test_series: Option<usize>,
}

impl Dataset {
    pub fn open(source: &DatasetSource) -> Result<Self> {
        let root = source.path().to_path_buf();
        match source {
            DatasetSource::Local(path) => info!("Loading dataset from {}", path.display()),
            DatasetSource::Named { name, path } => {
                info!("Loading dataset {} from {}", name, path.display())
            }
        }

        if !root.is_dir() {
            return Err(EntrypointError::Dataset(format!(
                "dataset directory not found: {}",
                root.display()
            )));
        }

        let metadata = load_metadata(&root)?;
        let train_series = count_series(&root.join(TRAIN_CHANNEL))?;
        let test_series = count_series(&root.join(TEST_CHANNEL))?;

        Ok(Self {
            root,
            metadata,
            train_series,
            test_series,
        })
    }
}

/// Read `metadata/metadata.json`, falling back to `metadata.json`.
pub fn load_metadata(dir: &Path) -> Result<DatasetMetadata> {
    let nested = dir.join("metadata").join(METADATA_FILE);
    let path = if nested.is_file() {
        nested
    } else {
        dir.join(METADATA_FILE)
    };

    let content = std::fs::read_to_string(&path).map_err(|err| {
        EntrypointError::Dataset(format!("failed to read {}: {}", path.display(), err))
    })?;
    let metadata: DatasetMetadata = serde_json::from_str(&content).map_err(|err| {
        EntrypointError::Dataset(format!("invalid metadata in {}: {}", path.display(), err))
    })?;

    debug!("metadata from {}: {:?}", path.display(), metadata);
    Ok(metadata)
}

/// Count JSON-lines entries in a channel, or `None` if they cannot be counted.
///
/// A channel is a single file or a directory of `.json`/`.jsonl` files.
/// Absent channels and gzip-compressed series files are not counted.
pub fn count_series(channel: &Path) -> Result<Option<usize>> {
    if channel.is_file() {
        if is_gzip(channel) {
            warn!("{}: compressed series are not counted", channel.display());
            return Ok(None);
        }
        return count_lines(channel).map(Some);
    }
    if !channel.is_dir() {
        return Ok(None);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(channel)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && !is_hidden(path))
        .collect();
    files.sort();

    if files.iter().any(|path| is_gzip(path)) {
        warn!("{}: compressed series are not counted", channel.display());
        return Ok(None);
    }

    let mut total = 0;
    for file in files.iter().filter(|path| is_json_lines(path)) {
        total += count_lines(file)?;
    }
    Ok(Some(total))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn is_json_lines(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "json" || ext == "jsonl")
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Non-blank lines, compared as bytes so any encoding is counted.
fn count_lines(path: &Path) -> Result<usize> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = Vec::new();
    let mut count = 0;
    while reader.read_until(b'\n', &mut line)? > 0 {
        if !line.iter().all(u8::is_ascii_whitespace) {
            count += 1;
        }
        line.clear();
    }
    Ok(count)
}
