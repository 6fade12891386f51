// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PlateauError;

/// Minimum segment length used by the reference mean/variance method.
pub const DEFAULT_MIN_SEGMENT_LEN: usize = 2;

/// Search constraints shared by every detection unit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraints {
    /// No reported segment is shorter than this, unless the whole series is.
    pub min_segment_len: usize,
    /// Per-unit deadline; exceeding it fails the unit with `DetectionTimeout`.
    pub time_budget_ms: Option<u64>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_segment_len: DEFAULT_MIN_SEGMENT_LEN,
            time_budget_ms: None,
        }
    }
}

impl Constraints {
    pub fn validate(&self) -> Result<(), PlateauError> {
        if self.min_segment_len == 0 {
            return Err(PlateauError::invalid_input(
                "constraints.min_segment_len must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Constraints, DEFAULT_MIN_SEGMENT_LEN};

    #[test]
    fn defaults_match_reference_method() {
        let constraints = Constraints::default();
        assert_eq!(constraints.min_segment_len, DEFAULT_MIN_SEGMENT_LEN);
        assert!(constraints.time_budget_ms.is_none());
        constraints.validate().expect("defaults must validate");
    }

    #[test]
    fn zero_min_segment_len_is_rejected() {
        let err = Constraints {
            min_segment_len: 0,
            ..Constraints::default()
        }
        .validate()
        .expect_err("zero min_segment_len must fail");
        assert!(err.to_string().contains("min_segment_len"));
    }
}
