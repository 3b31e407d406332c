//! Uncertainty sampling over posterior probabilities.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use pythia_core::{IQueryStrategy, IndexSet, PythiaError, PythiaResult, SelectionContext};

use crate::ranking::select_by_scores;

/// How to turn a posterior row into an informativeness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// `1 - max(p)`; larger means less confident.
    LeastConfident,
    /// `p_first - p_second`; smaller means harder to separate.
    Margin,
    /// Shannon entropy of the posterior.
    Entropy,
}

/// Scores each unlabeled instance by the fitted model's predictive
/// uncertainty and selects the most ambiguous batch.
pub struct UncertaintySampling {
    measure: Measure,
}

impl UncertaintySampling {
    pub fn new(measure: Measure) -> Self {
        Self { measure }
    }

    fn score_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        match self.measure {
            Measure::LeastConfident => {
                let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                1.0 - max
            }
            Measure::Margin => {
                let mut first = f64::NEG_INFINITY;
                let mut second = f64::NEG_INFINITY;
                for &p in row.iter() {
                    if p > first {
                        second = first;
                        first = p;
                    } else if p > second {
                        second = p;
                    }
                }
                first - second
            }
            Measure::Entropy => row
                .iter()
                .filter(|&&p| p > 0.0)
                .map(|&p| -p * p.ln())
                .sum(),
        }
    }

    fn scores(&self, proba: &Array2<f64>) -> Vec<f64> {
        proba
            .axis_iter(Axis(0))
            .map(|row| self.score_row(row))
            .collect()
    }
}

impl IQueryStrategy for UncertaintySampling {
    fn name(&self) -> &'static str {
        match self.measure {
            Measure::LeastConfident => "uncertainty_least_confident",
            Measure::Margin => "uncertainty_margin",
            Measure::Entropy => "uncertainty_entropy",
        }
    }

    fn is_maximal(&self) -> bool {
        !matches!(self.measure, Measure::Margin)
    }

    fn select(
        &self,
        x: ArrayView2<'_, f64>,
        _y: ArrayView1<'_, f64>,
        _labeled: &IndexSet,
        unlabeled: &IndexSet,
        batch_size: usize,
        ctx: &SelectionContext<'_>,
    ) -> PythiaResult<IndexSet> {
        let model = ctx
            .model
            .ok_or(PythiaError::MissingComponent { name: "model" })?;
        let pool_x = x.select(Axis(0), unlabeled.as_slice());
        let proba = model.predict_proba(pool_x.view())?;
        if proba.nrows() != unlabeled.len() {
            return Err(PythiaError::ShapeMismatch {
                expected: format!("{} posterior rows", unlabeled.len()),
                actual: format!("{} posterior rows", proba.nrows()),
            });
        }
        let scores = self.scores(&proba);
        select_by_scores(unlabeled, &scores, batch_size, self.is_maximal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};
    use pythia_core::IModel;

    /// Returns a fixed posterior regardless of input.
    struct FixedPosterior {
        proba: Array2<f64>,
    }

    impl IModel for FixedPosterior {
        fn fit(
            &mut self,
            _x: ArrayView2<'_, f64>,
            _y: ArrayView1<'_, f64>,
        ) -> PythiaResult<()> {
            Ok(())
        }

        fn predict(&self, x: ArrayView2<'_, f64>) -> PythiaResult<Array1<f64>> {
            Ok(Array1::zeros(x.nrows()))
        }

        fn predict_proba(&self, _x: ArrayView2<'_, f64>) -> PythiaResult<Array2<f64>> {
            Ok(self.proba.clone())
        }
    }

    fn pool_of(n: usize) -> (Array2<f64>, Array1<f64>, IndexSet, IndexSet) {
        let x = Array2::<f64>::zeros((n, 2));
        let y = Array1::<f64>::zeros(n);
        (x, y, IndexSet::new(), IndexSet::from_indices(0..n))
    }

    #[test]
    fn least_confident_prefers_flat_posterior() {
        let (x, y, labeled, unlabeled) = pool_of(3);
        let model = FixedPosterior {
            proba: array![[0.9, 0.1], [0.5, 0.5], [0.7, 0.3]],
        };
        let strat = UncertaintySampling::new(Measure::LeastConfident);
        let ctx = SelectionContext {
            model: Some(&model),
            pool: None,
        };
        let chosen = strat
            .select(x.view(), y.view(), &labeled, &unlabeled, 1, &ctx)
            .unwrap();
        assert_eq!(chosen.as_slice(), &[1]);
    }

    #[test]
    fn margin_prefers_narrowest_gap() {
        let (x, y, labeled, unlabeled) = pool_of(3);
        let model = FixedPosterior {
            proba: array![[0.9, 0.1], [0.55, 0.45], [0.7, 0.3]],
        };
        let strat = UncertaintySampling::new(Measure::Margin);
        assert!(!strat.is_maximal());
        let ctx = SelectionContext {
            model: Some(&model),
            pool: None,
        };
        let chosen = strat
            .select(x.view(), y.view(), &labeled, &unlabeled, 1, &ctx)
            .unwrap();
        assert_eq!(chosen.as_slice(), &[1]);
    }

    #[test]
    fn entropy_prefers_uniform_posterior() {
        let (x, y, labeled, unlabeled) = pool_of(2);
        let model = FixedPosterior {
            proba: array![[1.0, 0.0], [0.5, 0.5]],
        };
        let strat = UncertaintySampling::new(Measure::Entropy);
        let ctx = SelectionContext {
            model: Some(&model),
            pool: None,
        };
        let chosen = strat
            .select(x.view(), y.view(), &labeled, &unlabeled, 1, &ctx)
            .unwrap();
        assert_eq!(chosen.as_slice(), &[1]);
    }

    #[test]
    fn missing_model_is_reported() {
        let (x, y, labeled, unlabeled) = pool_of(2);
        let strat = UncertaintySampling::new(Measure::Entropy);
        let ctx = SelectionContext::default();
        let err = strat
            .select(x.view(), y.view(), &labeled, &unlabeled, 1, &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            PythiaError::MissingComponent { name: "model" }
        ));
    }
}
