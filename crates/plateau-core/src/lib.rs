// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Core shared types for plateau: validated sequences and outlier sets,
//! errors, search constraints, penalties, segmentation results and the
//! sequence classifier.

pub mod classification;
pub mod constraints;
pub mod control;
pub mod detectors;
pub mod diagnostics;
pub mod error;
pub mod execution_context;
pub mod numeric;
pub mod penalty;
pub mod repro;
pub mod results;
pub mod sequence;

pub use classification::{Classification, classify};
pub use constraints::{Constraints, DEFAULT_MIN_SEGMENT_LEN};
pub use control::CancelToken;
pub use detectors::OfflineDetector;
pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, Diagnostics, PruningStats};
pub use error::PlateauError;
pub use execution_context::ExecutionContext;
pub use numeric::{prefix_sums, prefix_sums_kahan, segment_mean};
pub use penalty::{Penalty, penalty_value};
pub use repro::ReproMode;
pub use results::{Segmentation, validate_breakpoints};
pub use sequence::{OutlierSet, Sequence};

pub fn crate_name() -> &'static str {
    "plateau-core"
}
