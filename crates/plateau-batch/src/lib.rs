// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Batch changepoint analysis of benchmark result sets.

pub mod orchestrator;
pub mod results;

pub use orchestrator::{AnalysisOutput, BatchConfig, BatchError, DEFAULT_WINDOW_SIZE, analyze};
pub use results::{BenchmarkResultSet, ExecutionData, OutlierData, OutlierSelection};

pub fn crate_name() -> &'static str {
    "plateau-batch"
}
