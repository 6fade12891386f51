// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::PlateauError;

/// Per-changepoint penalty for penalized changepoint search.
///
/// With `p` parameters per segment and `n` samples:
///
/// | variant          | beta                    |
/// |------------------|-------------------------|
/// | `Mbic` (default) | `(p + 2) ln n`          |
/// | `Bic`            | `(p + 1) ln n`          |
/// | `Aic`            | `2 (p + 1)`             |
/// | `HannanQuinn`    | `2 (p + 1) ln ln n`     |
/// | `LogScaled(k)`   | `k ln n`                |
/// | `Manual(beta)`   | `beta`                  |
///
/// `Mbic` additionally charges `ln(segment length)` per segment; searches
/// add that term when [`Penalty::charges_segment_length`] is true.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Penalty {
    #[default]
    Mbic,
    Bic,
    Aic,
    HannanQuinn,
    LogScaled(f64),
    Manual(f64),
}

impl Penalty {
    pub fn charges_segment_length(&self) -> bool {
        matches!(self, Self::Mbic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mbic => "mbic",
            Self::Bic => "bic",
            Self::Aic => "aic",
            Self::HannanQuinn => "hannan_quinn",
            Self::LogScaled(_) => "log_scaled",
            Self::Manual(_) => "manual",
        }
    }
}

/// Resolves `penalty` to a numeric beta for a series of `n` samples.
pub fn penalty_value(
    penalty: &Penalty,
    n: usize,
    params_per_segment: usize,
) -> Result<f64, PlateauError> {
    if n == 0 {
        return Err(PlateauError::insufficient_data(
            "penalty requires n >= 1; got n=0",
        ));
    }
    if params_per_segment == 0 {
        return Err(PlateauError::invalid_input(
            "params_per_segment must be >= 1; got 0",
        ));
    }

    let p = params_per_segment as f64;
    let ln_n = (n as f64).ln();
    let beta = match *penalty {
        Penalty::Mbic => (p + 2.0) * ln_n,
        Penalty::Bic => (p + 1.0) * ln_n,
        Penalty::Aic => 2.0 * (p + 1.0),
        Penalty::HannanQuinn => 2.0 * (p + 1.0) * ln_n.ln(),
        Penalty::LogScaled(k) => {
            if !k.is_finite() || k <= 0.0 {
                return Err(PlateauError::invalid_input(format!(
                    "LogScaled penalty multiplier must be finite and > 0.0; got {k}"
                )));
            }
            k * ln_n
        }
        Penalty::Manual(beta) => beta,
    };
    Ok(beta)
}
