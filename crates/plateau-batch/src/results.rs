// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use plateau_core::PlateauError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Per-benchmark execution sequences, keyed by `bench:vm:variant`.
pub type ExecutionData = BTreeMap<String, Vec<Vec<f64>>>;

/// Per-benchmark outlier indices, aligned 1:1 with [`ExecutionData`].
pub type OutlierData = BTreeMap<String, Vec<Vec<usize>>>;

/// Which outlier mapping of a result set feeds exclusion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierSelection {
    /// Every outlier flagged for the execution.
    #[default]
    All,
    /// Outliers shared with other executions of the same benchmark.
    Common,
    /// Outliers seen in this execution only.
    Unique,
    /// Skip outlier exclusion.
    None,
}

impl OutlierSelection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Common => "common",
            Self::Unique => "unique",
            Self::None => "none",
        }
    }
}

impl fmt::Display for OutlierSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutlierSelection {
    type Err = PlateauError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "common" => Ok(Self::Common),
            "unique" => Ok(Self::Unique),
            "none" => Ok(Self::None),
            _ => Err(PlateauError::invalid_input(format!(
                "unknown outlier selection '{raw}'; expected one of: all, common, unique, none"
            ))),
        }
    }
}

/// Benchmark timings plus the optional outlier mappings that accompany them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResultSet {
    pub data: ExecutionData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_outliers: Option<OutlierData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_outliers: Option<OutlierData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_outliers: Option<OutlierData>,
}

impl BenchmarkResultSet {
    pub fn new(data: ExecutionData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn with_outliers(mut self, selection: OutlierSelection, outliers: OutlierData) -> Self {
        match selection {
            OutlierSelection::All => self.all_outliers = Some(outliers),
            OutlierSelection::Common => self.common_outliers = Some(outliers),
            OutlierSelection::Unique => self.unique_outliers = Some(outliers),
            OutlierSelection::None => {}
        }
        self
    }

    /// The mapping selected by `selection`, `None` when absent or disabled.
    pub fn outliers(&self, selection: OutlierSelection) -> Option<&OutlierData> {
        match selection {
            OutlierSelection::All => self.all_outliers.as_ref(),
            OutlierSelection::Common => self.common_outliers.as_ref(),
            OutlierSelection::Unique => self.unique_outliers.as_ref(),
            OutlierSelection::None => None,
        }
    }

    pub fn benchmark_count(&self) -> usize {
        self.data.len()
    }

    /// Total number of process executions across all benchmarks.
    pub fn execution_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{BenchmarkResultSet, OutlierData, OutlierSelection};
    use std::collections::BTreeMap;

    #[test]
    fn outlier_selection_parses_and_displays() {
        for selection in [
            OutlierSelection::All,
            OutlierSelection::Common,
            OutlierSelection::Unique,
            OutlierSelection::None,
        ] {
            let parsed: OutlierSelection = selection
                .to_string()
                .parse()
                .expect("display output should parse");
            assert_eq!(parsed, selection);
        }
        assert_eq!(
            " Common ".parse::<OutlierSelection>().expect("case-insensitive"),
            OutlierSelection::Common
        );
        let err = "most".parse::<OutlierSelection>().expect_err("unknown name");
        assert!(err.to_string().contains("unknown outlier selection"));
    }

    #[test]
    fn selected_outlier_mapping_is_returned() {
        let mut data = BTreeMap::new();
        data.insert("fib:PyPy:default-python".to_string(), vec![vec![1.0, 2.0], vec![3.0]]);
        let mut unique: OutlierData = BTreeMap::new();
        unique.insert("fib:PyPy:default-python".to_string(), vec![vec![1], vec![]]);

        let results =
            BenchmarkResultSet::new(data).with_outliers(OutlierSelection::Unique, unique.clone());
        assert_eq!(results.outliers(OutlierSelection::Unique), Some(&unique));
        assert_eq!(results.outliers(OutlierSelection::All), None);
        assert_eq!(results.outliers(OutlierSelection::None), None);
        assert_eq!(results.benchmark_count(), 1);
        assert_eq!(results.execution_count(), 2);
    }

    #[test]
    fn deserializes_krun_shaped_json_without_outliers() {
        let raw = r#"{"data": {"b:vm:v": [[1.0, 2.0, 3.0]]}}"#;
        let results: BenchmarkResultSet =
            serde_json::from_str(raw).expect("krun-shaped json should deserialize");
        assert_eq!(results.data["b:vm:v"], vec![vec![1.0, 2.0, 3.0]]);
        assert!(results.all_outliers.is_none());

        let encoded = serde_json::to_string(&results).expect("serialize");
        assert!(!encoded.contains("all_outliers"));
    }
}
