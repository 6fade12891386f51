// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared input generators for the criterion benches.

pub fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

/// Uniform noise in `[-0.5, 0.5)` from the top 53 bits of the LCG state.
pub fn lcg_unit(state: &mut u64) -> f64 {
    ((lcg_next(state) >> 11) as f64 / (1u64 << 53) as f64) - 0.5
}

/// A warm-up shaped execution: a slow first quarter settling onto a plateau.
pub fn warmup_series(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let settle = n / 4;
    (0..n)
        .map(|idx| {
            let level = if idx < settle { 1.3 } else { 1.0 };
            level + 0.05 * lcg_unit(&mut state)
        })
        .collect()
}

/// Evenly spaced outlier indices, roughly one per `every` samples.
pub fn spaced_outliers(n: usize, every: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    let every = every.max(1);
    (0..n / every)
        .map(|block| block * every + (lcg_next(&mut state) as usize) % every)
        .filter(|&idx| idx < n)
        .collect()
}

pub fn crate_name() -> &'static str {
    let _ = (
        plateau_batch::crate_name(),
        plateau_core::crate_name(),
        plateau_costs::crate_name(),
        plateau_offline::crate_name(),
    );
    "plateau-bench"
}
