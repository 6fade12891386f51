// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::model::CostModel;
use plateau_core::{PlateauError, ReproMode, Sequence, prefix_sums, prefix_sums_kahan};
use std::f64::consts::PI;

/// Variance substituted for degenerate (constant) segments.
pub const VARIANCE_FLOOR: f64 = 1e-11;

/// Gaussian cost for joint changes in mean and variance.
///
/// For a segment of `m` samples with MLE variance `s2` the cost is twice the
/// negative log-likelihood, `m * (ln(2 pi) + ln(s2) + 1)`. A segment whose
/// variance is not positive uses [`VARIANCE_FLOOR`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CostNormalMeanVar;

impl CostNormalMeanVar {
    pub const fn new() -> Self {
        Self
    }
}

/// Prefix sums of `x` and `x^2` for O(1) segment variance.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalCache {
    prefix_sum: Vec<f64>,
    prefix_sum_sq: Vec<f64>,
    n: usize,
}

impl NormalCache {
    pub fn n(&self) -> usize {
        self.n
    }

    /// MLE variance of `[start, end)` before flooring.
    pub fn raw_variance(&self, start: usize, end: usize) -> f64 {
        let m = (end - start) as f64;
        let sum = self.prefix_sum[end] - self.prefix_sum[start];
        let sum_sq = self.prefix_sum_sq[end] - self.prefix_sum_sq[start];
        (sum_sq - sum * sum / m) / m
    }

    pub fn mean(&self, start: usize, end: usize) -> f64 {
        let m = (end - start) as f64;
        (self.prefix_sum[end] - self.prefix_sum[start]) / m
    }
}

impl CostModel for CostNormalMeanVar {
    type Cache = NormalCache;

    fn name(&self) -> &'static str {
        "normal_meanvar"
    }

    fn min_segment_len(&self) -> usize {
        2
    }

    fn precompute(
        &self,
        x: &Sequence<'_>,
        repro_mode: ReproMode,
    ) -> Result<Self::Cache, PlateauError> {
        self.validate(x)?;

        let values = x.values();
        let squares: Vec<f64> = values.iter().map(|v| v * v).collect();
        if let Some(idx) = squares.iter().position(|v| !v.is_finite()) {
            return Err(PlateauError::numerical_issue(format!(
                "squared sample overflows at index {idx}: value={}",
                values[idx]
            )));
        }

        let (prefix_sum, prefix_sum_sq) = if matches!(repro_mode, ReproMode::Strict) {
            (prefix_sums_kahan(values), prefix_sums_kahan(&squares))
        } else {
            (prefix_sums(values), prefix_sums(&squares))
        };

        Ok(NormalCache {
            prefix_sum,
            prefix_sum_sq,
            n: x.len(),
        })
    }

    fn segment_cost(&self, cache: &Self::Cache, start: usize, end: usize) -> f64 {
        assert!(
            start < end,
            "segment_cost requires start < end; got start={start}, end={end}"
        );
        assert!(
            end <= cache.n,
            "segment_cost end out of bounds: end={end}, n={}",
            cache.n
        );

        let m = (end - start) as f64;
        let mut variance = cache.raw_variance(start, end);
        if variance <= 0.0 {
            variance = VARIANCE_FLOOR;
        }
        m * ((2.0 * PI).ln() + variance.ln() + 1.0)
    }
}
