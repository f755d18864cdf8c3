// ============================================================
// COLUMN DESCRIPTOR
// ============================================================
// Per-column summary derived from sampled rows only

use serde::{Deserialize, Serialize};

/// Value type inferred for a column from its sampled values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Integer,
    Float,
    String,
    Boolean,
    Datetime,
    /// Both numeric and non-numeric values were observed
    Mixed,
}

impl std::fmt::Display for InferredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InferredType::Integer => "integer",
            InferredType::Float => "float",
            InferredType::String => "string",
            InferredType::Boolean => "boolean",
            InferredType::Datetime => "datetime",
            InferredType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Summary statistics of a numeric column's sampled values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,

    /// Sample standard deviation; absent with fewer than two values
    pub std: Option<f64>,
}

impl NumericStats {
    /// `None` for an empty slice
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.len() > 1).then(|| {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        });
        Some(Self { min, max, mean, std })
    }

    /// Largest absolute value seen
    pub fn magnitude(&self) -> f64 {
        self.min.abs().max(self.max.abs())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Header name
    pub name: String,

    pub inferred_type: InferredType,

    /// Sampled rows with an empty or null-like value in this column
    pub null_count: usize,

    /// Distinct non-null values in the sample
    pub distinct_count: usize,

    /// Share of sampled rows that were null, 0.0 - 100.0
    pub null_percentage: f32,

    /// Up to three distinct non-null sampled values, in first-seen order
    pub sample_values: Vec<String>,

    /// Present for integer and float columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<NumericStats>,
}

impl ColumnDescriptor {
    /// Descriptor for a column with no sampled rows
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inferred_type: InferredType::String,
            null_count: 0,
            distinct_count: 0,
            null_percentage: 0.0,
            sample_values: Vec::new(),
            stats: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_stats() {
        let stats = NumericStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.mean, 5.0);
        assert!((stats.std.unwrap() - 2.138).abs() < 0.001);
        assert_eq!(stats.magnitude(), 9.0);
    }

    #[test]
    fn test_numeric_stats_edges() {
        assert!(NumericStats::from_values(&[]).is_none());

        let single = NumericStats::from_values(&[-3.5]).unwrap();
        assert_eq!(single.std, None);
        assert_eq!(single.magnitude(), 3.5);
    }
}
