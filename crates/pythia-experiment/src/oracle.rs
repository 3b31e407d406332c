//! Ground-truth-backed oracle for simulated experiments.

use ndarray::{Array1, ArrayView2};
use pythia_core::{IOracle, IndexSet, PythiaError, PythiaResult};

/// Answers queries from a complete ground-truth label vector, charging a
/// flat cost per labeled sample.
pub struct SimulatedOracle {
    labels: Array1<f64>,
    cost_per_query: f64,
}

impl SimulatedOracle {
    pub fn new(labels: Array1<f64>, cost_per_query: f64) -> Self {
        Self {
            labels,
            cost_per_query,
        }
    }
}

impl IOracle for SimulatedOracle {
    fn query(
        &self,
        _instances: ArrayView2<'_, f64>,
        indexes: &IndexSet,
    ) -> PythiaResult<(Vec<f64>, f64)> {
        let mut labels = Vec::with_capacity(indexes.len());
        for idx in indexes {
            if idx >= self.labels.len() {
                return Err(PythiaError::OutOfBounds {
                    index: idx,
                    len: self.labels.len(),
                });
            }
            labels.push(self.labels[idx]);
        }
        let cost = self.cost_per_query * indexes.len() as f64;
        Ok((labels, cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn returns_ground_truth_in_index_order() {
        let oracle = SimulatedOracle::new(array![0.0, 1.0, 2.0, 3.0], 1.5);
        let selected = IndexSet::from_indices([1, 3]);
        let instances = Array2::<f64>::zeros((2, 2));
        let (labels, cost) = oracle.query(instances.view(), &selected).unwrap();
        assert_eq!(labels, vec![1.0, 3.0]);
        assert!((cost - 3.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_index_is_rejected() {
        let oracle = SimulatedOracle::new(array![0.0, 1.0], 1.0);
        let selected = IndexSet::from_indices([5]);
        let instances = Array2::<f64>::zeros((1, 2));
        assert!(oracle.query(instances.view(), &selected).is_err());
    }
}
