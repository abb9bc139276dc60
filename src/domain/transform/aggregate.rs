// Aggregator - reduce a value sequence to one scalar
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    #[default]
    Mean,
    Median,
    Max,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Mean => "mean",
            AggregationMethod::Median => "median",
            AggregationMethod::Max => "max",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduce `values` with `method`. An empty sequence reduces to 0.
pub fn aggregate(values: &[f64], method: AggregationMethod) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    match method {
        AggregationMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AggregationMethod::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
        AggregationMethod::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
