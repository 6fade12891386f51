// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PlateauError;
use std::fmt;
use std::str::FromStr;

/// Behaviour label for one process execution.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classification {
    #[cfg_attr(feature = "serde", serde(rename = "flat"))]
    Flat,
    #[cfg_attr(feature = "serde", serde(rename = "no steady state"))]
    NoSteadyState,
    #[cfg_attr(feature = "serde", serde(rename = "warm-up"))]
    WarmUp,
    #[cfg_attr(feature = "serde", serde(rename = "slow down"))]
    SlowDown,
}

impl Classification {
    pub const ALL: [Self; 4] = [
        Self::Flat,
        Self::NoSteadyState,
        Self::WarmUp,
        Self::SlowDown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::NoSteadyState => "no steady state",
            Self::WarmUp => "warm-up",
            Self::SlowDown => "slow down",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = PlateauError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == raw)
            .ok_or_else(|| {
                PlateauError::invalid_input(format!(
                    "unknown classification '{raw}'; expected one of: flat, no steady state, warm-up, slow down"
                ))
            })
    }
}

/// Classifies a segmented sequence. The first matching rule wins:
///
/// 1. no changepoints: [`Classification::Flat`];
/// 2. last changepoint inside the trailing window
///    (`last > sequence_length - window_size`): [`Classification::NoSteadyState`];
/// 3. final segment mean equals the minimum mean: [`Classification::WarmUp`];
/// 4. otherwise [`Classification::SlowDown`].
///
/// `window_size` may exceed `sequence_length`.
pub fn classify(
    sequence_length: usize,
    changepoints: &[usize],
    means: &[f64],
    window_size: usize,
) -> Result<Classification, PlateauError> {
    if window_size == 0 {
        return Err(PlateauError::InvalidWindowSize(window_size));
    }
    if sequence_length == 0 {
        return Err(PlateauError::insufficient_data(
            "cannot classify a sequence of length 0",
        ));
    }

    let Some(&last) = changepoints.last() else {
        return Ok(Classification::Flat);
    };

    if means.len() != changepoints.len() + 1 {
        return Err(PlateauError::invalid_input(format!(
            "expected {} segment means for {} changepoints; got {}",
            changepoints.len() + 1,
            changepoints.len(),
            means.len()
        )));
    }
    if let Some(pair) = changepoints.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(PlateauError::invalid_input(format!(
            "changepoints must be strictly increasing; got {} followed by {}",
            pair[0], pair[1]
        )));
    }
    if last >= sequence_length {
        return Err(PlateauError::invalid_input(format!(
            "changepoint {last} lies outside a sequence of length {sequence_length}"
        )));
    }
    if let Some(bad) = means.iter().find(|mean| !mean.is_finite()) {
        return Err(PlateauError::numerical_issue(format!(
            "segment means must be finite; got {bad}"
        )));
    }

    // last > sequence_length - window_size, without signed arithmetic.
    if last.saturating_add(window_size) > sequence_length {
        return Ok(Classification::NoSteadyState);
    }

    let min_mean = means.iter().copied().fold(f64::INFINITY, f64::min);
    let final_mean = means[means.len() - 1];
    if final_mean == min_mean {
        Ok(Classification::WarmUp)
    } else {
        Ok(Classification::SlowDown)
    }
}
