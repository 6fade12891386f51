// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Reading, analysing and re-writing Krun results files.

use bzip2::Compression;
use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use plateau_batch::{AnalysisOutput, BatchConfig, BatchError, BenchmarkResultSet, analyze};
use plateau_core::PlateauError;
use serde_json::{Map, Value};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const RESULT_KEYS: [&str; 4] = ["data", "all_outliers", "common_outliers", "unique_outliers"];
const OUTPUT_SUFFIX: &str = "_changepoints";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Plateau(#[from] PlateauError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    InvalidInput(String),
}

impl CliError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Batch(err) => err.code(),
            Self::Plateau(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

/// A Krun results file: the full JSON object plus the parts analysis reads.
#[derive(Clone, Debug)]
pub struct KrunResults {
    pub path: PathBuf,
    pub compressed: bool,
    pub document: Map<String, Value>,
    pub results: BenchmarkResultSet,
}

fn is_bz2(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("bz2"))
}

/// Loads a `.json` or `.json.bz2` Krun results file.
pub fn load_results(path: &Path) -> Result<KrunResults, CliError> {
    let raw = fs::read(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    let compressed = is_bz2(path);
    let bytes = if compressed {
        let mut decoded = Vec::new();
        MultiBzDecoder::new(raw.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|source| {
                CliError::io(format!("failed to decompress '{}'", path.display()), source)
            })?;
        decoded
    } else {
        raw
    };

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|source| CliError::json(format!("invalid JSON in '{}'", path.display()), source))?;
    let Value::Object(document) = value else {
        return Err(CliError::invalid_input(format!(
            "'{}' must contain a JSON object at the top level",
            path.display()
        )));
    };
    if !document.contains_key("data") {
        return Err(CliError::invalid_input(format!(
            "'{}' is not a Krun results file: missing 'data'",
            path.display()
        )));
    }

    let subset: Map<String, Value> = RESULT_KEYS
        .iter()
        .filter_map(|&key| {
            document
                .get(key)
                .filter(|value| !value.is_null())
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect();
    let results: BenchmarkResultSet = serde_json::from_value(Value::Object(subset)).map_err(
        |source| CliError::json(format!("malformed results in '{}'", path.display()), source),
    )?;

    Ok(KrunResults {
        path: path.to_path_buf(),
        compressed,
        document,
        results,
    })
}

/// `<stem>_changepoints.json`, plus `.bz2` when `compressed`, placed in
/// `output_dir` or next to the input.
pub fn output_path(input: &Path, output_dir: Option<&Path>, compressed: bool) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let without_bz2 = file_name
        .strip_suffix(".bz2")
        .unwrap_or(file_name.as_str());
    let stem = without_bz2.strip_suffix(".json").unwrap_or(without_bz2);

    let mut name = format!("{stem}{OUTPUT_SUFFIX}.json");
    if compressed {
        name.push_str(".bz2");
    }

    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Adds analysis results to a Krun document, leaving every other key intact.
pub fn augment(
    document: &mut Map<String, Value>,
    output: &AnalysisOutput,
    window_size: usize,
) -> Result<(), CliError> {
    let encode = |value: serde_json::Result<Value>| {
        value.map_err(|source| CliError::json("failed to encode analysis output", source))
    };
    document.insert(
        "changepoints".to_string(),
        encode(serde_json::to_value(&output.changepoints))?,
    );
    document.insert(
        "changepoint_means".to_string(),
        encode(serde_json::to_value(&output.changepoint_means))?,
    );
    document.insert(
        "classifications".to_string(),
        encode(serde_json::to_value(&output.classifications))?,
    );
    document.insert("window_size".to_string(), Value::from(window_size));
    Ok(())
}

/// Serializes `document` fully in memory before touching `path`.
pub fn write_results(
    path: &Path,
    document: &Map<String, Value>,
    compressed: bool,
) -> Result<(), CliError> {
    let encoded = serde_json::to_vec(document)
        .map_err(|source| CliError::json("failed to serialize results", source))?;
    let bytes = if compressed {
        let compress_err = |source: std::io::Error| {
            CliError::io(format!("failed to compress '{}'", path.display()), source)
        };
        let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&encoded).map_err(compress_err)?;
        encoder.finish().map_err(compress_err)?
    } else {
        encoded
    };
    fs::write(path, bytes)
        .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
}

/// Analyses one results file and writes the augmented copy.
///
/// Nothing is written unless every execution in the file was analysed.
pub fn process_file(
    input: &Path,
    config: &BatchConfig,
    output_dir: Option<&Path>,
) -> Result<PathBuf, CliError> {
    tracing::info!(path = %input.display(), "loading results");
    let mut loaded = load_results(input)?;
    let output = analyze(&loaded.results, config)?;

    for (label, count) in output.label_counts() {
        tracing::info!(%label, count, "classification summary");
    }

    augment(&mut loaded.document, &output, config.window_size)?;
    let destination = output_path(input, output_dir, loaded.compressed);
    write_results(&destination, &loaded.document, loaded.compressed)?;
    tracing::info!(path = %destination.display(), "wrote changepoints");
    Ok(destination)
}

pub fn crate_name() -> &'static str {
    let _ = (
        plateau_batch::crate_name(),
        plateau_core::crate_name(),
        plateau_offline::crate_name(),
    );
    "plateau-cli"
}
