// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::results::{BenchmarkResultSet, OutlierData, OutlierSelection};
use plateau_core::{
    CancelToken, Classification, Constraints, ExecutionContext, PlateauError, ReproMode, classify,
};
use plateau_offline::{ChangepointDetector, PeltConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_WINDOW_SIZE: usize = 200;

/// Settings for one [`analyze`] pass.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Trailing samples in which a changepoint means "no steady state".
    pub window_size: usize,
    pub pelt: PeltConfig,
    /// Applied to every unit; `time_budget_ms` is a per-unit deadline.
    pub constraints: Constraints,
    pub repro_mode: ReproMode,
    pub outliers: OutlierSelection,
    /// Size of a dedicated worker pool; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            pelt: PeltConfig::default(),
            constraints: Constraints::default(),
            repro_mode: ReproMode::default(),
            outliers: OutlierSelection::default(),
            threads: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("benchmark '{benchmark}' execution {execution}: {source}")]
    Unit {
        benchmark: String,
        execution: usize,
        #[source]
        source: PlateauError,
    },
    #[error("outlier data misaligned for benchmark '{benchmark}': {reason}")]
    Misaligned { benchmark: String, reason: String },
    #[error("invalid batch configuration: {0}")]
    Config(#[from] PlateauError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl BatchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unit { source, .. } => source.code(),
            Self::Misaligned { .. } => "misaligned_outliers",
            Self::Config(source) => source.code(),
            Self::ThreadPool(_) => "thread_pool",
        }
    }
}

/// Changepoints, segment means and labels, each aligned 1:1 with the
/// execution lists of the analysed result set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub changepoints: BTreeMap<String, Vec<Vec<usize>>>,
    pub changepoint_means: BTreeMap<String, Vec<Vec<f64>>>,
    pub classifications: BTreeMap<String, Vec<Classification>>,
}

impl AnalysisOutput {
    /// Number of executions per label, over all benchmarks.
    pub fn label_counts(&self) -> BTreeMap<Classification, usize> {
        let mut counts: BTreeMap<Classification, usize> =
            Classification::ALL.into_iter().map(|label| (label, 0)).collect();
        for label in self.classifications.values().flatten() {
            *counts.entry(*label).or_default() += 1;
        }
        counts
    }
}

struct Unit<'a> {
    benchmark: &'a str,
    execution: usize,
    values: &'a [f64],
    outliers: &'a [usize],
}

type UnitResult = Result<(Vec<usize>, Vec<f64>, Classification), PlateauError>;

fn collect_units<'a>(
    results: &'a BenchmarkResultSet,
    outliers: Option<&'a OutlierData>,
) -> Result<Vec<Unit<'a>>, BatchError> {
    let mut units = Vec::with_capacity(results.execution_count());
    for (benchmark, executions) in &results.data {
        let per_execution = match outliers {
            Some(map) => {
                let lists = map.get(benchmark).ok_or_else(|| BatchError::Misaligned {
                    benchmark: benchmark.clone(),
                    reason: "no outlier entry for benchmark".to_string(),
                })?;
                if lists.len() != executions.len() {
                    return Err(BatchError::Misaligned {
                        benchmark: benchmark.clone(),
                        reason: format!(
                            "{} outlier lists for {} executions",
                            lists.len(),
                            executions.len()
                        ),
                    });
                }
                Some(lists)
            }
            None => None,
        };

        for (execution, values) in executions.iter().enumerate() {
            units.push(Unit {
                benchmark,
                execution,
                values,
                outliers: per_execution.map_or(&[][..], |lists| lists[execution].as_slice()),
            });
        }
    }
    Ok(units)
}

fn analyze_unit(
    unit: &Unit<'_>,
    detector: &ChangepointDetector,
    config: &BatchConfig,
    cancel: &CancelToken,
) -> UnitResult {
    if cancel.is_cancelled() {
        return Err(PlateauError::cancelled());
    }
    let ctx = ExecutionContext::new(&config.constraints)
        .with_cancel(cancel)
        .with_repro_mode(config.repro_mode);

    let outcome = detector
        .detect_with_indices(unit.values, unit.outliers, &ctx)
        .and_then(|set| {
            let label = classify(
                unit.values.len(),
                &set.changepoints,
                &set.means,
                config.window_size,
            )?;
            Ok((set.changepoints, set.means, label))
        });

    if let Err(err) = &outcome
        && !err.is_cancelled()
    {
        cancel.cancel();
    }
    outcome
}

fn run_units(
    units: &[Unit<'_>],
    detector: &ChangepointDetector,
    config: &BatchConfig,
) -> Vec<UnitResult> {
    let cancel = CancelToken::new();
    units
        .par_iter()
        .map(|unit| analyze_unit(unit, detector, config, &cancel))
        .collect()
}

/// Detects changepoints in, and classifies, every execution of every
/// benchmark in `results`.
///
/// Units run in parallel; output order matches input order. Any failure
/// fails the whole batch and cancels the units still running. The error
/// reported is the earliest real failure, in input order, among the units
/// that finished; a unit that stopped on cancellation may hide a failure it
/// would otherwise have raised.
pub fn analyze(
    results: &BenchmarkResultSet,
    config: &BatchConfig,
) -> Result<AnalysisOutput, BatchError> {
    if config.window_size == 0 {
        return Err(PlateauError::InvalidWindowSize(config.window_size).into());
    }
    config.constraints.validate()?;
    let detector = ChangepointDetector::new(config.pelt.clone())?;

    let outliers = results.outliers(config.outliers);
    if outliers.is_none() && results.execution_count() > 0 {
        tracing::warn!(
            selection = %config.outliers,
            "no outlier data selected; outlier exclusion skipped"
        );
    }

    let units = collect_units(results, outliers)?;
    let unit_results = match config.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| BatchError::ThreadPool(err.to_string()))?
            .install(|| run_units(&units, &detector, config)),
        None => run_units(&units, &detector, config),
    };

    if let Some(idx) = first_failure(&unit_results) {
        let unit = &units[idx];
        if let Err(source) = &unit_results[idx] {
            return Err(BatchError::Unit {
                benchmark: unit.benchmark.to_string(),
                execution: unit.execution,
                source: source.clone(),
            });
        }
    }

    let mut output = AnalysisOutput::default();
    for benchmark in results.data.keys() {
        output.changepoints.insert(benchmark.clone(), Vec::new());
        output.changepoint_means.insert(benchmark.clone(), Vec::new());
        output.classifications.insert(benchmark.clone(), Vec::new());
    }
    for (unit, result) in units.iter().zip(unit_results) {
        let Ok((changepoints, means, label)) = result else {
            continue;
        };
        if let Some(list) = output.changepoints.get_mut(unit.benchmark) {
            list.push(changepoints);
        }
        if let Some(list) = output.changepoint_means.get_mut(unit.benchmark) {
            list.push(means);
        }
        if let Some(list) = output.classifications.get_mut(unit.benchmark) {
            list.push(label);
        }
    }

    tracing::info!(
        benchmarks = results.benchmark_count(),
        executions = units.len(),
        "changepoint analysis finished"
    );
    Ok(output)
}

/// Index of the error to report: the first real failure in input order,
/// falling back to the first cancellation.
fn first_failure(unit_results: &[UnitResult]) -> Option<usize> {
    unit_results
        .iter()
        .position(|r| matches!(r, Err(err) if !err.is_cancelled()))
        .or_else(|| unit_results.iter().position(Result::is_err))
}
