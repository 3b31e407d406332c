use ndarray::ArrayView2;

use crate::collections::IndexSet;
use crate::errors::PythiaResult;

/// Supplies ground-truth labels for selected samples, at a cost.
pub trait IOracle: Send + Sync {
    /// Label the given rows of the feature matrix.
    ///
    /// `instances` holds the selected rows in the order of `indexes`;
    /// returns one label per row plus the total cost of the query.
    fn query(
        &self,
        instances: ArrayView2<'_, f64>,
        indexes: &IndexSet,
    ) -> PythiaResult<(Vec<f64>, f64)>;
}
