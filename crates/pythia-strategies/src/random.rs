//! Uniform random selection baseline.

use std::sync::Mutex;

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use pythia_core::{IQueryStrategy, IndexSet, PythiaError, PythiaResult, SelectionContext};

/// Samples a batch uniformly at random from the unlabeled pool.
pub struct RandomSampling {
    rng: Mutex<StdRng>,
}

impl RandomSampling {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSampling {
    fn default() -> Self {
        Self::new()
    }
}

impl IQueryStrategy for RandomSampling {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select(
        &self,
        _x: ArrayView2<'_, f64>,
        _y: ArrayView1<'_, f64>,
        _labeled: &IndexSet,
        unlabeled: &IndexSet,
        batch_size: usize,
        _ctx: &SelectionContext<'_>,
    ) -> PythiaResult<IndexSet> {
        if batch_size == 0 {
            return Err(PythiaError::InvalidBatchSize { batch_size });
        }
        if unlabeled.len() <= batch_size {
            return Ok(unlabeled.clone());
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let picks = rand::seq::index::sample(&mut *rng, unlabeled.len(), batch_size);
        Ok(picks.iter().map(|i| unlabeled.as_slice()[i]).collect())
    }
}
