use ndarray::{ArrayView1, ArrayView2};

use crate::collections::IndexSet;
use crate::errors::PythiaResult;
use crate::traits::model::IModel;

/// Everything a strategy may need beyond the data and the index partition.
///
/// Always passed to [`IQueryStrategy::select`]; strategies that need
/// neither the current model nor a worker pool simply ignore it.
#[derive(Clone, Copy, Default)]
pub struct SelectionContext<'a> {
    /// The model fitted in the current iteration.
    pub model: Option<&'a dyn IModel>,
    /// Worker pool for fanning out scoring work inside the phase.
    pub pool: Option<&'a rayon::ThreadPool>,
}

impl<'a> SelectionContext<'a> {
    pub fn new(model: Option<&'a dyn IModel>, pool: Option<&'a rayon::ThreadPool>) -> Self {
        Self { model, pool }
    }
}

/// Picks the most informative unlabeled samples each iteration.
pub trait IQueryStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Does a higher score mean more informative? Drives the shared
    /// top-k/bottom-k selection helpers.
    fn is_maximal(&self) -> bool {
        true
    }

    /// Choose at most `batch_size` indices out of `unlabeled`.
    ///
    /// When the unlabeled pool is not larger than `batch_size` the whole
    /// pool is returned.
    fn select(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        labeled: &IndexSet,
        unlabeled: &IndexSet,
        batch_size: usize,
        ctx: &SelectionContext<'_>,
    ) -> PythiaResult<IndexSet>;
}
