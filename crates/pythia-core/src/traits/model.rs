use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::errors::{PythiaError, PythiaResult};

/// A trainable model with point predictions and, optionally,
/// class-probability output.
pub trait IModel: Send + Sync {
    fn name(&self) -> &str {
        "model"
    }

    /// Fit on the labeled subset.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> PythiaResult<()>;

    /// Point predictions, one per row of `x`.
    fn predict(&self, x: ArrayView2<'_, f64>) -> PythiaResult<Array1<f64>>;

    /// Class-probability matrix `[n_samples, n_classes]`.
    ///
    /// Models without probabilistic output keep the default, which errors;
    /// strategies that need probabilities surface that error unchanged.
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> PythiaResult<Array2<f64>> {
        let _ = x;
        Err(PythiaError::ProbaUnsupported {
            model: self.name().to_string(),
        })
    }
}
