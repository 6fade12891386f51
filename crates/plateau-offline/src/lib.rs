// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Exact penalized changepoint search and the outlier-aware detector built on it.

pub mod detector;
pub mod pelt;

pub use detector::{ChangepointDetector, ChangepointSet};
pub use pelt::{Pelt, PeltConfig};

pub fn crate_name() -> &'static str {
    let _ = (plateau_core::crate_name(), plateau_costs::crate_name());
    "plateau-offline"
}
