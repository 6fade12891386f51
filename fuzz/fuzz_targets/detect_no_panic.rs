// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use plateau_core::{Constraints, ExecutionContext, Penalty, classify};
use plateau_offline::{ChangepointDetector, PeltConfig};

const MAX_SAMPLES: usize = 512;

fn build_penalty(kind_seed: u8, value_seed: u8) -> Penalty {
    match kind_seed % 6 {
        0 => Penalty::Mbic,
        1 => Penalty::Bic,
        2 => Penalty::Aic,
        3 => Penalty::HannanQuinn,
        4 => Penalty::LogScaled(f64::from(value_seed) / 32.0),
        _ => Penalty::Manual(f64::from(value_seed) / 8.0),
    }
}

fn build_value(mode_seed: u8, raw: i16) -> f64 {
    match mode_seed % 9 {
        0 => 0.0,
        1 => f64::from(raw),
        2 => f64::from(raw) / 1024.0,
        3 => f64::from(raw) * 1.0e150,
        4 => f64::NAN,
        5 => f64::INFINITY,
        _ => f64::from(raw % 4),
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let penalty = build_penalty(data[0], data[1]);
    let min_segment_len = usize::from(data[2] % 8);
    let window_size = usize::from(data[3]);

    let mut values = Vec::new();
    let mut outliers = Vec::new();
    for chunk in data[4..].chunks_exact(3).take(MAX_SAMPLES) {
        let raw = i16::from_le_bytes([chunk[1], chunk[2]]);
        if chunk[0] >= 0xf0 {
            outliers.push(values.len());
        }
        values.push(build_value(chunk[0], raw));
    }

    let constraints = Constraints {
        min_segment_len,
        ..Constraints::default()
    };
    let ctx = ExecutionContext::new(&constraints);
    let Ok(detector) = ChangepointDetector::new(PeltConfig {
        penalty,
        ..PeltConfig::default()
    }) else {
        return;
    };

    if let Ok(result) = detector.detect_with_indices(&values, &outliers, &ctx) {
        assert_eq!(result.means.len(), result.changepoints.len() + 1);
        for pair in result.changepoints.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for &cp in &result.changepoints {
            assert!(cp < values.len());
            assert!(outliers.binary_search(&cp).is_err());
        }
        let _ = classify(values.len(), &result.changepoints, &result.means, window_size);
    }
});
