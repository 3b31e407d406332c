//! Query-by-committee with bagged committee members.

use std::sync::Mutex;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use pythia_core::{IModel, IQueryStrategy, IndexSet, PythiaError, PythiaResult, SelectionContext};

/// Produces a fresh, unfitted model per committee member or lookahead step.
pub type ModelFactory = Box<dyn Fn() -> Box<dyn IModel> + Send + Sync>;

/// How committee members' outputs are aggregated into a disagreement score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disagreement {
    /// Entropy of the label vote distribution; uses hard predictions.
    VoteEntropy,
    /// Mean KL divergence of each member posterior from the consensus.
    KlDivergence,
}

/// Trains a bagged committee on the labeled set and queries the instances
/// the members disagree on most.
pub struct QueryByCommittee {
    factory: ModelFactory,
    committee_size: usize,
    disagreement: Disagreement,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for QueryByCommittee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryByCommittee")
            .field("committee_size", &self.committee_size)
            .field("disagreement", &self.disagreement)
            .finish_non_exhaustive()
    }
}

impl QueryByCommittee {
    pub fn new(
        factory: ModelFactory,
        committee_size: usize,
        disagreement: Disagreement,
    ) -> PythiaResult<Self> {
        if committee_size < 2 {
            return Err(PythiaError::CommitteeTooSmall {
                size: committee_size,
            });
        }
        Ok(Self {
            factory,
            committee_size,
            disagreement,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    pub fn seeded(
        factory: ModelFactory,
        committee_size: usize,
        disagreement: Disagreement,
        seed: u64,
    ) -> PythiaResult<Self> {
        let mut qbc = Self::new(factory, committee_size, disagreement)?;
        qbc.rng = Mutex::new(StdRng::seed_from_u64(seed));
        Ok(qbc)
    }

    /// Fit one committee on bootstrap resamples of the labeled data.
    fn fit_committee(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        labeled: &IndexSet,
        ctx: &SelectionContext<'_>,
    ) -> PythiaResult<Vec<Box<dyn IModel>>> {
        let pool_idx = labeled.as_slice();
        let bags: Vec<Vec<usize>> = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            (0..self.committee_size)
                .map(|_| {
                    (0..pool_idx.len())
                        .map(|_| pool_idx[rng.gen_range(0..pool_idx.len())])
                        .collect()
                })
                .collect()
        };
        let fit_one = |bag: &Vec<usize>| -> PythiaResult<Box<dyn IModel>> {
            let bag_x = x.select(Axis(0), bag);
            let bag_y = y.select(Axis(0), bag);
            let mut member = (self.factory)();
            member.fit(bag_x.view(), bag_y.view())?;
            Ok(member)
        };
        match ctx.pool {
            Some(pool) => pool.install(|| bags.par_iter().map(fit_one).collect()),
            None => bags.iter().map(fit_one).collect(),
        }
    }

    fn vote_entropy_scores(
        members: &[Box<dyn IModel>],
        pool_x: ArrayView2<'_, f64>,
    ) -> PythiaResult<Vec<f64>> {
        let votes: Vec<Array1<f64>> = members
            .iter()
            .map(|m| m.predict(pool_x))
            .collect::<PythiaResult<_>>()?;
        let k = members.len() as f64;
        let mut scores = vec![0.0; pool_x.nrows()];
        for (i, score) in scores.iter_mut().enumerate() {
            let mut counts: Vec<(f64, usize)> = Vec::new();
            for member_votes in &votes {
                let label = member_votes[i];
                match counts.iter_mut().find(|(l, _)| *l == label) {
                    Some((_, c)) => *c += 1,
                    None => counts.push((label, 1)),
                }
            }
            *score = counts
                .iter()
                .map(|&(_, c)| {
                    let p = c as f64 / k;
                    -p * p.ln()
                })
                .sum();
        }
        Ok(scores)
    }

    fn kl_divergence_scores(
        members: &[Box<dyn IModel>],
        pool_x: ArrayView2<'_, f64>,
    ) -> PythiaResult<Vec<f64>> {
        let posteriors: Vec<Array2<f64>> = members
            .iter()
            .map(|m| m.predict_proba(pool_x))
            .collect::<PythiaResult<_>>()?;
        let shape = posteriors[0].dim();
        for p in &posteriors[1..] {
            if p.dim() != shape {
                return Err(PythiaError::ShapeMismatch {
                    expected: format!("{:?}", shape),
                    actual: format!("{:?}", p.dim()),
                });
            }
        }
        let k = posteriors.len() as f64;
        let mut consensus = Array2::<f64>::zeros(shape);
        for p in &posteriors {
            consensus += p;
        }
        consensus /= k;

        let mut scores = vec![0.0; shape.0];
        for (i, score) in scores.iter_mut().enumerate() {
            let mut total = 0.0;
            for p in &posteriors {
                for j in 0..shape.1 {
                    let pij = p[[i, j]];
                    let cij = consensus[[i, j]];
                    if pij > 0.0 && cij > 0.0 {
                        total += pij * (pij / cij).ln();
                    }
                }
            }
            *score = total / k;
        }
        Ok(scores)
    }
}

impl IQueryStrategy for QueryByCommittee {
    fn name(&self) -> &'static str {
        match self.disagreement {
            Disagreement::VoteEntropy => "qbc_vote_entropy",
            Disagreement::KlDivergence => "qbc_kl_divergence",
        }
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
        if labeled.is_empty() {
            return Err(PythiaError::MissingComponent {
                name: "labeled set",
            });
        }
        let members = self.fit_committee(x, y, labeled, ctx)?;
        debug!(
            committee_size = members.len(),
            pool = unlabeled.len(),
            "committee fitted"
        );
        let pool_x = x.select(Axis(0), unlabeled.as_slice());
        let scores = match self.disagreement {
            Disagreement::VoteEntropy => Self::vote_entropy_scores(&members, pool_x.view())?,
            Disagreement::KlDivergence => Self::kl_divergence_scores(&members, pool_x.view())?,
        };
        crate::ranking::select_by_scores(unlabeled, &scores, batch_size, self.is_maximal())
    }
}
