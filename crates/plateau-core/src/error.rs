// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors raised by changepoint detection and sequence classification.
///
/// None of these are transient: callers should not retry.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlateauError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("invalid outlier index {index}: sequence has {len} samples")]
    InvalidOutlierIndex { index: usize, len: usize },
    #[error("invalid outlier index {0}: index listed more than once")]
    DuplicateOutlierIndex(usize),
    #[error("invalid window size {0}: window size must be > 0")]
    InvalidWindowSize(usize),
    #[error("detection timed out: elapsed_ms={elapsed_ms}, limit_ms={limit_ms}")]
    DetectionTimeout { elapsed_ms: u128, limit_ms: u64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
    #[error("cancelled")]
    Cancelled,
}

impl PlateauError {
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    /// Stable machine-readable code for structured error output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientData(_) => "insufficient_data",
            Self::InvalidOutlierIndex { .. } | Self::DuplicateOutlierIndex(_) => {
                "invalid_outlier_index"
            }
            Self::InvalidWindowSize(_) => "invalid_window_size",
            Self::DetectionTimeout { .. } => "detection_timeout",
            Self::InvalidInput(_) => "invalid_input",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::PlateauError;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(PlateauError::cancelled().to_string(), "cancelled");
        assert_eq!(
            PlateauError::InvalidOutlierIndex { index: 9, len: 4 }.to_string(),
            "invalid outlier index 9: sequence has 4 samples"
        );
        assert_eq!(
            PlateauError::InvalidWindowSize(0).to_string(),
            "invalid window size 0: window size must be > 0"
        );
        assert!(
            PlateauError::insufficient_data("no samples left")
                .to_string()
                .contains("no samples left")
        );
    }

    #[test]
    fn duplicate_and_out_of_bounds_share_a_code() {
        assert_eq!(
            PlateauError::DuplicateOutlierIndex(3).code(),
            PlateauError::InvalidOutlierIndex { index: 3, len: 2 }.code()
        );
        assert_eq!(
            PlateauError::DetectionTimeout {
                elapsed_ms: 12,
                limit_ms: 10
            }
            .code(),
            "detection_timeout"
        );
    }
}
