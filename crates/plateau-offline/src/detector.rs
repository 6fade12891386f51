// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::pelt::{Pelt, PeltConfig};
use plateau_core::{
    Diagnostics, ExecutionContext, OfflineDetector, OutlierSet, PlateauError, Sequence,
    segment_mean,
};
use plateau_costs::CostNormalMeanVar;

/// Changepoints of one execution, in original sample indexing, with the
/// mean of every segment.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangepointSet {
    /// Interior segment starts, strictly increasing, never an outlier index.
    pub changepoints: Vec<usize>,
    /// One mean per segment, computed over outlier-free samples.
    pub means: Vec<f64>,
    pub diagnostics: Diagnostics,
}

impl ChangepointSet {
    pub fn segment_count(&self) -> usize {
        self.means.len()
    }
}

/// Runs an offline detector over a sequence with its outliers excluded and
/// reports the result against the original sequence.
#[derive(Debug)]
pub struct ChangepointDetector<D = Pelt<CostNormalMeanVar>> {
    detector: D,
}

impl ChangepointDetector<Pelt<CostNormalMeanVar>> {
    /// PELT over the joint normal mean/variance cost.
    pub fn new(config: PeltConfig) -> Result<Self, PlateauError> {
        Ok(Self {
            detector: Pelt::new(CostNormalMeanVar::new(), config)?,
        })
    }
}

impl<D: OfflineDetector> ChangepointDetector<D> {
    pub fn with_detector(detector: D) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Detects changepoints in `values` after removing `outliers`.
    ///
    /// Fails with `InsufficientData` when no sample survives exclusion.
    pub fn detect(
        &self,
        values: &[f64],
        outliers: &OutlierSet,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ChangepointSet, PlateauError> {
        if let Some(&last) = outliers.indices().last()
            && last >= values.len()
        {
            return Err(PlateauError::InvalidOutlierIndex {
                index: last,
                len: values.len(),
            });
        }

        let working = outliers.remove_from(values);
        if working.is_empty() {
            return Err(PlateauError::insufficient_data(format!(
                "all {} samples are outliers",
                values.len()
            )));
        }
        let sequence = Sequence::new(&working)?;
        let segmentation = self.detector.detect(&sequence, ctx)?;

        let means = segmentation
            .segments()
            .map(|(start, end)| {
                segment_mean(&working, start, end).ok_or_else(|| {
                    PlateauError::numerical_issue(format!(
                        "empty segment [{start}, {end}) in detector output"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // change_points already omits the terminal boundary at working.len().
        let changepoints = segmentation
            .change_points
            .iter()
            .map(|&w| outliers.to_original(w))
            .collect();

        Ok(ChangepointSet {
            changepoints,
            means,
            diagnostics: segmentation.diagnostics,
        })
    }

    /// Like [`ChangepointDetector::detect`], validating raw outlier indices first.
    pub fn detect_with_indices(
        &self,
        values: &[f64],
        outlier_indices: &[usize],
        ctx: &ExecutionContext<'_>,
    ) -> Result<ChangepointSet, PlateauError> {
        let outliers = OutlierSet::new(outlier_indices.iter().copied(), values.len())?;
        self.detect(values, &outliers, ctx)
    }
}
