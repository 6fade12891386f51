// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PlateauError;
use crate::diagnostics::Diagnostics;

/// Validates a breakpoint list: non-empty, strictly increasing, every
/// entry in `1..=n`, and terminated by the sentinel `n`.
pub fn validate_breakpoints(n: usize, breakpoints: &[usize]) -> Result<(), PlateauError> {
    let Some(&last) = breakpoints.last() else {
        return Err(PlateauError::invalid_input(
            "breakpoints must contain at least the terminal index n",
        ));
    };
    if last != n {
        return Err(PlateauError::invalid_input(format!(
            "last breakpoint must equal n={n}; got {last}"
        )));
    }
    if breakpoints[0] == 0 {
        return Err(PlateauError::invalid_input(
            "breakpoints must be > 0; got 0",
        ));
    }
    if let Some(pair) = breakpoints.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(PlateauError::invalid_input(format!(
            "breakpoints must be strictly increasing; got {} followed by {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Output of an offline segmentation over `n` samples.
///
/// `breakpoints` are exclusive segment ends and always finish with the
/// sentinel `n`; `change_points` is the same list without the sentinel.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Segmentation {
    pub breakpoints: Vec<usize>,
    pub change_points: Vec<usize>,
    pub diagnostics: Diagnostics,
}

impl Segmentation {
    pub fn new(
        n: usize,
        breakpoints: Vec<usize>,
        diagnostics: Diagnostics,
    ) -> Result<Self, PlateauError> {
        validate_breakpoints(n, &breakpoints)?;
        let change_points = breakpoints[..breakpoints.len() - 1].to_vec();
        Ok(Self {
            breakpoints,
            change_points,
            diagnostics,
        })
    }

    /// Half-open `[start, end)` ranges, one per segment.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let starts = std::iter::once(0).chain(self.change_points.iter().copied());
        starts.zip(self.breakpoints.iter().copied())
    }

    pub fn segment_count(&self) -> usize {
        self.breakpoints.len()
    }
}
