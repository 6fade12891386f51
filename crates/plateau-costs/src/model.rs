// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use plateau_core::{PlateauError, ReproMode, Sequence};

/// Segment cost contract used by penalized changepoint search.
///
/// Segments are half-open intervals `[start, end)`. `precompute` builds
/// whatever statistics make `segment_cost` O(1).
pub trait CostModel {
    type Cache: std::fmt::Debug;

    fn name(&self) -> &'static str;

    /// Minimum segment length for which the cost is well defined.
    fn min_segment_len(&self) -> usize {
        1
    }

    fn validate(&self, x: &Sequence<'_>) -> Result<(), PlateauError> {
        if x.is_empty() {
            return Err(PlateauError::insufficient_data(format!(
                "{} requires n >= 1; got n=0",
                self.name()
            )));
        }
        Ok(())
    }

    fn precompute(&self, x: &Sequence<'_>, repro_mode: ReproMode)
    -> Result<Self::Cache, PlateauError>;

    fn segment_cost(&self, cache: &Self::Cache, start: usize, end: usize) -> f64;
}
