// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use plateau_core::{ReproMode, Sequence};
use plateau_costs::{CostModel, CostNormalMeanVar};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

const ABS_TOL: f64 = 1e-7;
const REL_TOL: f64 = 1e-6;
const MIN_PROPTEST_CASES: u32 = 1000;
const LOG_2PI: f64 = 1.8378770664093453;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn relative_close(actual: f64, expected: f64) -> bool {
    let diff = (actual - expected).abs();
    let scale = 1.0 + expected.abs();
    diff <= ABS_TOL || diff <= REL_TOL * scale
}

fn naive_variance(values: &[f64], start: usize, end: usize) -> f64 {
    let segment = &values[start..end];
    let len = segment.len() as f64;
    let mean = segment.iter().sum::<f64>() / len;
    segment
        .iter()
        .map(|value| {
            let centered = *value - mean;
            centered * centered
        })
        .sum::<f64>()
        / len
}

fn segment_strategy() -> impl Strategy<Value = (Vec<f64>, usize, usize)> {
    prop::collection::vec(-50.0f64..50.0, 2..96).prop_flat_map(|values| {
        let n = values.len();
        (Just(values), 0..n - 1).prop_flat_map(move |(values, start)| {
            (Just(values), Just(start), (start + 2)..=n)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        max_shrink_iters: 1024,
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct("proptest-regressions/tests/proptest_invariants.txt"))),
        .. ProptestConfig::default()
    })]

    #[test]
    fn normal_meanvar_matches_two_pass_likelihood((values, start, end) in segment_strategy()) {
        let naive_var = naive_variance(&values, start, end);
        prop_assume!(naive_var > 1.0);

        let seq = Sequence::new(&values).expect("generated values are finite");
        let model = CostNormalMeanVar::new();
        for repro_mode in [ReproMode::Balanced, ReproMode::Strict] {
            let cache = model
                .precompute(&seq, repro_mode)
                .expect("precompute should succeed for bounded values");
            let actual = model.segment_cost(&cache, start, end);
            let m = (end - start) as f64;
            let expected = m * (LOG_2PI + naive_var.ln() + 1.0);
            prop_assert!(
                relative_close(actual, expected),
                "cost mismatch on [{start}, {end}) in {repro_mode:?}: actual={actual}, expected={expected}"
            );
        }
    }

    #[test]
    fn normal_meanvar_is_shift_invariant(
        (values, start, end) in segment_strategy(),
        shift in -1_000.0f64..1_000.0,
    ) {
        prop_assume!(naive_variance(&values, start, end) > 1.0);
        let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();

        let model = CostNormalMeanVar::new();
        let base_seq = Sequence::new(&values).expect("generated values are finite");
        let shifted_seq = Sequence::new(&shifted).expect("shifted values are finite");
        let base_cache = model
            .precompute(&base_seq, ReproMode::Strict)
            .expect("precompute should succeed");
        let shifted_cache = model
            .precompute(&shifted_seq, ReproMode::Strict)
            .expect("precompute should succeed");

        let base = model.segment_cost(&base_cache, start, end);
        let moved = model.segment_cost(&shifted_cache, start, end);
        prop_assert!(
            (base - moved).abs() <= 1e-4 * (1.0 + base.abs()),
            "shift changed cost on [{start}, {end}): {base} vs {moved}"
        );
    }
}
