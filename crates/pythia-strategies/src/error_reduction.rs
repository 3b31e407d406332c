//! Expected error reduction via one-step lookahead.

use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use tracing::debug;

use pythia_core::{IModel, IQueryStrategy, IndexSet, PythiaError, PythiaResult, SelectionContext};

use crate::committee::ModelFactory;

/// Scores each candidate by the expected loss of a model retrained with
/// that candidate added under each hypothetical label, weighted by the
/// current model's posterior. Lower expected loss means a better query.
pub struct ExpectedErrorReduction {
    factory: ModelFactory,
}

impl ExpectedErrorReduction {
    pub fn new(factory: ModelFactory) -> Self {
        Self { factory }
    }

    /// Distinct labels of the labeled set, ascending. Posterior columns
    /// are assumed to follow this ordering.
    fn classes(y: ArrayView1<'_, f64>, labeled: &IndexSet) -> Vec<f64> {
        let mut classes: Vec<f64> = labeled.iter().map(|i| y[i]).collect();
        classes.sort_by(f64::total_cmp);
        classes.dedup();
        classes
    }

    /// Expected 0/1 loss of `member` over `eval_x`: sum of `1 - max(p)`.
    fn expected_loss(member: &dyn IModel, eval_x: ArrayView2<'_, f64>) -> PythiaResult<f64> {
        if eval_x.nrows() == 0 {
            return Ok(0.0);
        }
        let proba = member.predict_proba(eval_x)?;
        Ok(proba
            .axis_iter(Axis(0))
            .map(|row| 1.0 - row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .sum())
    }

    fn candidate_score(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        labeled: &IndexSet,
        unlabeled: &IndexSet,
        candidate: usize,
        posterior: &[f64],
        classes: &[f64],
    ) -> PythiaResult<f64> {
        let mut train_idx: Vec<usize> = labeled.iter().collect();
        train_idx.push(candidate);
        let train_x = x.select(Axis(0), &train_idx);
        let mut train_y: Vec<f64> = labeled.iter().map(|i| y[i]).collect();
        train_y.push(0.0);

        let eval_idx: Vec<usize> = unlabeled.iter().filter(|&i| i != candidate).collect();
        let eval_x = x.select(Axis(0), &eval_idx);

        let mut score = 0.0;
        for (j, &class) in classes.iter().enumerate() {
            *train_y.last_mut().unwrap() = class;
            let mut member = (self.factory)();
            member.fit(train_x.view(), ArrayView1::from(&train_y))?;
            score += posterior[j] * Self::expected_loss(member.as_ref(), eval_x.view())?;
        }
        Ok(score)
    }
}

impl IQueryStrategy for ExpectedErrorReduction {
    fn name(&self) -> &'static str {
        "expected_error_reduction"
    }

    fn is_maximal(&self) -> bool {
        false
    }

    fn select(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        labeled: &IndexSet,
        unlabeled: &IndexSet,
        batch_size: usize,
        ctx: &SelectionContext<'_>,
    ) -> PythiaResult<IndexSet> {
        let model = ctx
            .model
            .ok_or(PythiaError::MissingComponent { name: "model" })?;
        if labeled.is_empty() {
            return Err(PythiaError::MissingComponent {
                name: "labeled set",
            });
        }
        let classes = Self::classes(y, labeled);
        let pool_x = x.select(Axis(0), unlabeled.as_slice());
        let proba = model.predict_proba(pool_x.view())?;
        if proba.ncols() != classes.len() {
            return Err(PythiaError::ShapeMismatch {
                expected: format!("{} posterior columns", classes.len()),
                actual: format!("{} posterior columns", proba.ncols()),
            });
        }
        let candidates: Vec<usize> = unlabeled.iter().collect();
        let score_one = |(i, &candidate): (usize, &usize)| -> PythiaResult<f64> {
            let posterior: Vec<f64> = proba.row(i).to_vec();
            self.candidate_score(x, y, labeled, unlabeled, candidate, &posterior, &classes)
        };
        let scores: Vec<f64> = match ctx.pool {
            Some(pool) => pool.install(|| {
                candidates
                    .par_iter()
                    .enumerate()
                    .map(score_one)
                    .collect::<PythiaResult<_>>()
            })?,
            None => candidates
                .iter()
                .enumerate()
                .map(score_one)
                .collect::<PythiaResult<_>>()?,
        };
        debug!(candidates = candidates.len(), "lookahead scores computed");
        crate::ranking::select_by_scores(unlabeled, &scores, batch_size, self.is_maximal())
    }
}
