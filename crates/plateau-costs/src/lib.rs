// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod model;
pub mod normal;

pub use model::CostModel;
pub use normal::{CostNormalMeanVar, NormalCache, VARIANCE_FLOOR};

pub fn crate_name() -> &'static str {
    let _ = plateau_core::crate_name();
    "plateau-costs"
}
