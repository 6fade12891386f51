// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PlateauError;

/// Borrowed, validated view over one process execution's timing samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sequence<'a> {
    values: &'a [f64],
}

impl<'a> Sequence<'a> {
    /// Constructs a validated `Sequence`.
    ///
    /// Fails with `InsufficientData` for an empty slice and `InvalidInput`
    /// when any sample is NaN or infinite.
    pub fn new(values: &'a [f64]) -> Result<Self, PlateauError> {
        if values.is_empty() {
            return Err(PlateauError::insufficient_data(
                "sequence must contain at least one sample",
            ));
        }
        if let Some((idx, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(PlateauError::invalid_input(format!(
                "sequence samples must be finite: index {idx} has {value}"
            )));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sorted, de-duplicated set of sample indices excluded from analysis.
///
/// Besides the indices themselves the set keeps `shifted[j] = outliers[j] - j`,
/// which is non-decreasing and lets [`OutlierSet::to_original`] map a
/// working-sequence index back with one binary search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutlierSet {
    indices: Vec<usize>,
    shifted: Vec<usize>,
}

impl OutlierSet {
    /// An empty set: nothing is excluded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set over a sequence of `len` samples.
    ///
    /// Indices may arrive in any order; duplicates and indices `>= len` are
    /// rejected.
    pub fn new(indices: impl IntoIterator<Item = usize>, len: usize) -> Result<Self, PlateauError> {
        let mut sorted: Vec<usize> = indices.into_iter().collect();
        sorted.sort_unstable();

        if let Some(&index) = sorted.iter().find(|&&idx| idx >= len) {
            return Err(PlateauError::InvalidOutlierIndex { index, len });
        }
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(PlateauError::DuplicateOutlierIndex(pair[0]));
        }

        let shifted = sorted
            .iter()
            .enumerate()
            .map(|(rank, &idx)| idx - rank)
            .collect();
        Ok(Self {
            indices: sorted,
            shifted,
        })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// Returns `values` with every outlier removed, preserving order.
    pub fn remove_from(&self, values: &[f64]) -> Vec<f64> {
        let mut working = Vec::with_capacity(values.len().saturating_sub(self.indices.len()));
        let mut outliers = self.indices.iter().copied().peekable();
        for (idx, &value) in values.iter().enumerate() {
            if outliers.next_if_eq(&idx).is_some() {
                continue;
            }
            working.push(value);
        }
        working
    }

    /// Maps an index into the outlier-free working sequence back to the
    /// index of the same sample in the original sequence.
    ///
    /// The `j`-th outlier precedes working index `w` exactly when
    /// `outliers[j] - j <= w`, so the shift is a partition point.
    pub fn to_original(&self, working_index: usize) -> usize {
        working_index + self.shifted.partition_point(|&key| key <= working_index)
    }
}

#[cfg(test)]
mod tests {
    use super::{OutlierSet, Sequence};
    use crate::PlateauError;

    #[test]
    fn sequence_rejects_empty_and_non_finite() {
        let err = Sequence::new(&[]).expect_err("empty sequence must fail");
        assert!(matches!(err, PlateauError::InsufficientData(_)));

        let err = Sequence::new(&[1.0, f64::NAN]).expect_err("NaN must fail");
        assert!(err.to_string().contains("index 1"));

        let err = Sequence::new(&[f64::INFINITY]).expect_err("inf must fail");
        assert!(matches!(err, PlateauError::InvalidInput(_)));

        let seq = Sequence::new(&[0.5, 0.25]).expect("finite sequence is valid");
        assert_eq!(seq.len(), 2);
        assert!(!seq.is_empty());
    }

    #[test]
    fn outlier_set_sorts_and_validates() {
        let set = OutlierSet::new([7, 2, 4], 8).expect("valid outliers");
        assert_eq!(set.indices(), &[2, 4, 7]);
        assert!(set.contains(4));
        assert!(!set.contains(5));

        let err = OutlierSet::new([1, 8], 8).expect_err("out of bounds must fail");
        assert_eq!(err, PlateauError::InvalidOutlierIndex { index: 8, len: 8 });

        let err = OutlierSet::new([3, 1, 3], 8).expect_err("duplicate must fail");
        assert_eq!(err, PlateauError::DuplicateOutlierIndex(3));
    }

    #[test]
    fn remove_from_preserves_order() {
        let set = OutlierSet::new([0, 3, 4], 6).expect("valid outliers");
        let working = set.remove_from(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        assert_eq!(working, vec![11.0, 12.0, 15.0]);

        let working = OutlierSet::empty().remove_from(&[1.0, 2.0]);
        assert_eq!(working, vec![1.0, 2.0]);
    }

    #[test]
    fn to_original_skips_every_preceding_outlier() {
        let set = OutlierSet::new([2, 3, 6], 10).expect("valid outliers");
        // original:  0 1 [2] [3] 4 5 [6] 7 8 9
        // working:   0 1         2 3     4 5 6
        let mapped: Vec<usize> = (0..7).map(|w| set.to_original(w)).collect();
        assert_eq!(mapped, vec![0, 1, 4, 5, 7, 8, 9]);
    }

    #[test]
    fn to_original_with_leading_outliers() {
        let set = OutlierSet::new([0, 1], 5).expect("valid outliers");
        assert_eq!(set.to_original(0), 2);
        assert_eq!(set.to_original(2), 4);
    }

    #[test]
    fn to_original_agrees_with_incremental_shifting() {
        let outliers = [1usize, 5, 6, 9, 14];
        let len = 20;
        let set = OutlierSet::new(outliers, len).expect("valid outliers");
        let working_len = len - outliers.len();

        for w in 0..working_len {
            let mut expected = w;
            for &o in &outliers {
                if o <= expected {
                    expected += 1;
                }
            }
            let mapped = set.to_original(w);
            assert_eq!(mapped, expected, "working index {w}");
            assert!(!set.contains(mapped));
        }
    }
}
