use ndarray::ArrayView1;

use crate::errors::PythiaResult;

/// A scalar performance measure over true vs predicted labels.
pub trait IMetric: Send + Sync {
    /// Name recorded in the ledger; entries must list metrics under the
    /// exact declared names, in order.
    fn metric_name(&self) -> &str;

    fn compute(
        &self,
        y_true: ArrayView1<'_, f64>,
        y_pred: ArrayView1<'_, f64>,
    ) -> PythiaResult<f64>;
}
