use serde::{Deserialize, Serialize};

use crate::collections::IndexSet;
use crate::errors::{PythiaError, PythiaResult};

/// One performance value. Most metrics are scalar; per-class metrics
/// (e.g. unaveraged F1) produce a vector, which excludes them from
/// mean/stdev aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerfValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl PerfValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            PerfValue::Scalar(v) => Some(*v),
            PerfValue::Vector(_) => None,
        }
    }
}

impl From<f64> for PerfValue {
    fn from(v: f64) -> Self {
        PerfValue::Scalar(v)
    }
}

/// A named performance measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub name: String,
    pub value: PerfValue,
}

impl MetricValue {
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: PerfValue::Scalar(value),
        }
    }
}

/// An immutable record of one active-learning iteration.
///
/// Captures the selected indices by value at construction; reads hand out
/// shared references. Construction is the only validation point: the metric
/// names must equal, in order, the ledger's declared metric-name list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    selected: IndexSet,
    metrics: Vec<MetricValue>,
    queried_labels: Option<Vec<f64>>,
    cost: Option<f64>,
    batch_size: usize,
}

impl LedgerEntry {
    /// Build an entry, checking `metrics` against the declared name list.
    pub fn new(
        selected: IndexSet,
        declared_metrics: &[String],
        metrics: Vec<MetricValue>,
        queried_labels: Option<Vec<f64>>,
        cost: Option<f64>,
    ) -> PythiaResult<Self> {
        let actual: Vec<String> = metrics.iter().map(|m| m.name.clone()).collect();
        if actual != declared_metrics {
            return Err(PythiaError::MetricMismatch {
                expected: declared_metrics.to_vec(),
                actual,
            });
        }
        let batch_size = selected.len();
        Ok(Self {
            selected,
            metrics,
            queried_labels,
            cost,
            batch_size,
        })
    }

    pub fn selected(&self) -> &IndexSet {
        &self.selected
    }

    pub fn metrics(&self) -> &[MetricValue] {
        &self.metrics
    }

    pub fn queried_labels(&self) -> Option<&[f64]> {
        self.queried_labels.as_deref()
    }

    pub fn cost(&self) -> Option<f64> {
        self.cost
    }

    /// Number of indices queried in this iteration.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared() -> Vec<String> {
        vec!["accuracy".to_string(), "zero_one_loss".to_string()]
    }

    #[test]
    fn metric_names_must_match_in_order() {
        let metrics = vec![
            MetricValue::scalar("zero_one_loss", 0.2),
            MetricValue::scalar("accuracy", 0.8),
        ];
        let err = LedgerEntry::new(IndexSet::from_indices([1]), &declared(), metrics, None, None)
            .unwrap_err();
        assert!(matches!(err, PythiaError::MetricMismatch { .. }));
    }

    #[test]
    fn batch_size_is_selected_len() {
        let metrics = vec![
            MetricValue::scalar("accuracy", 0.8),
            MetricValue::scalar("zero_one_loss", 0.2),
        ];
        let entry = LedgerEntry::new(
            IndexSet::from_indices([3, 5, 9]),
            &declared(),
            metrics,
            Some(vec![1.0, 0.0, 1.0]),
            Some(3.0),
        )
        .unwrap();
        assert_eq!(entry.batch_size(), 3);
        assert_eq!(entry.cost(), Some(3.0));
    }
}
