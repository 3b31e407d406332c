//! Baseline performance metrics.

use ndarray::ArrayView1;
use pythia_core::{IMetric, PythiaError, PythiaResult};

fn check_lengths(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> PythiaResult<()> {
    if y_true.len() != y_pred.len() {
        return Err(PythiaError::ShapeMismatch {
            expected: format!("{} labels", y_true.len()),
            actual: format!("{} labels", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(PythiaError::ShapeMismatch {
            expected: "at least one label".to_string(),
            actual: "0 labels".to_string(),
        });
    }
    Ok(())
}

/// Fraction of exactly matching predictions.
pub struct Accuracy;

impl IMetric for Accuracy {
    fn metric_name(&self) -> &str {
        "accuracy"
    }

    fn compute(
        &self,
        y_true: ArrayView1<'_, f64>,
        y_pred: ArrayView1<'_, f64>,
    ) -> PythiaResult<f64> {
        check_lengths(y_true, y_pred)?;
        let hits = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t == p)
            .count();
        Ok(hits as f64 / y_true.len() as f64)
    }
}

/// Fraction of misclassified predictions, the complement of [`Accuracy`].
pub struct ZeroOneLoss;

impl IMetric for ZeroOneLoss {
    fn metric_name(&self) -> &str {
        "zero_one_loss"
    }

    fn compute(
        &self,
        y_true: ArrayView1<'_, f64>,
        y_pred: ArrayView1<'_, f64>,
    ) -> PythiaResult<f64> {
        check_lengths(y_true, y_pred)?;
        let misses = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t != p)
            .count();
        Ok(misses as f64 / y_true.len() as f64)
    }
}

/// Mean squared error, for regression targets.
pub struct MeanSquaredError;

impl IMetric for MeanSquaredError {
    fn metric_name(&self) -> &str {
        "mean_squared_error"
    }

    fn compute(
        &self,
        y_true: ArrayView1<'_, f64>,
        y_pred: ArrayView1<'_, f64>,
    ) -> PythiaResult<f64> {
        check_lengths(y_true, y_pred)?;
        let sum: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p) * (t - p))
            .sum();
        Ok(sum / y_true.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn accuracy_counts_exact_matches() {
        let y_true = array![0.0, 1.0, 1.0, 0.0];
        let y_pred = array![0.0, 1.0, 0.0, 0.0];
        assert_eq!(Accuracy.compute(y_true.view(), y_pred.view()).unwrap(), 0.75);
    }

    #[test]
    fn zero_one_loss_complements_accuracy() {
        let y_true = array![0.0, 1.0, 1.0, 0.0];
        let y_pred = array![0.0, 1.0, 0.0, 0.0];
        let acc = Accuracy.compute(y_true.view(), y_pred.view()).unwrap();
        let loss = ZeroOneLoss.compute(y_true.view(), y_pred.view()).unwrap();
        assert!((acc + loss - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mse_on_regression_targets() {
        let y_true = array![1.0, 2.0];
        let y_pred = array![2.0, 4.0];
        let mse = MeanSquaredError
            .compute(y_true.view(), y_pred.view())
            .unwrap();
        assert!((mse - 2.5).abs() < 1e-12);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let y_true = array![1.0, 2.0];
        let y_pred = array![2.0];
        assert!(Accuracy.compute(y_true.view(), y_pred.view()).is_err());
    }
}
