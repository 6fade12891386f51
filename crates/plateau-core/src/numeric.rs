// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Prefix sums with a leading zero: `out[i] = values[0] + ... + values[i-1]`.
pub fn prefix_sums(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    let mut acc = 0.0;
    out.push(acc);
    for &value in values {
        acc += value;
        out.push(acc);
    }
    out
}

/// Kahan-compensated variant of [`prefix_sums`].
pub fn prefix_sums_kahan(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    let mut sum = 0.0;
    let mut compensation = 0.0;
    out.push(sum);
    for &value in values {
        let y = value - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
        out.push(sum);
    }
    out
}

/// Arithmetic mean of `values[start..end]`, `None` for an empty range.
pub fn segment_mean(values: &[f64], start: usize, end: usize) -> Option<f64> {
    if start >= end || end > values.len() {
        return None;
    }
    let sum: f64 = values[start..end].iter().sum();
    Some(sum / (end - start) as f64)
}
