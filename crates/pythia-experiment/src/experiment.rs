//! Hold-out and cross-validation experiment drivers.

use ndarray::ArrayView1;
use rand::Rng;
use tracing::info;

use pythia_core::{ExperimentConfig, LedgerSet, PythiaResult, StopPolicy};

use crate::al_loop::ActiveLearningLoop;
use crate::scenario::PoolScenario;
use crate::split::{split, FoldSplit};

/// Builds one scenario per fold from that fold's index partition.
pub type FoldScenarioFactory = Box<dyn Fn(&FoldSplit) -> PythiaResult<PoolScenario>>;

/// Runs a single pre-built scenario to completion.
pub struct HoldOutExperiment {
    method_name: String,
    config: ExperimentConfig,
}

impl HoldOutExperiment {
    pub fn new(method_name: impl Into<String>, config: ExperimentConfig) -> Self {
        Self {
            method_name: method_name.into(),
            config,
        }
    }

    pub fn run(
        self,
        scenario: PoolScenario,
        stop: StopPolicy,
        pool: Option<&rayon::ThreadPool>,
    ) -> PythiaResult<LedgerSet> {
        let mut al = ActiveLearningLoop::new(scenario, stop, self.config);
        let ledger = al.run(0, pool)?;
        info!(method = %self.method_name, "hold-out experiment finished");
        Ok(LedgerSet::new(self.method_name, vec![ledger]))
    }
}

/// Splits the data `fold_count` times and runs one independent loop per
/// fold, with collaborators rebuilt per fold from the factory.
pub struct CrossValidationExperiment {
    method_name: String,
    config: ExperimentConfig,
    scenario_factory: FoldScenarioFactory,
    stop_factory: Box<dyn Fn() -> StopPolicy>,
}

impl CrossValidationExperiment {
    pub fn new(
        method_name: impl Into<String>,
        config: ExperimentConfig,
        scenario_factory: FoldScenarioFactory,
        stop_factory: Box<dyn Fn() -> StopPolicy>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            config,
            scenario_factory,
            stop_factory,
        }
    }

    /// Folds run sequentially; each gets its own ledger, collected into
    /// one [`LedgerSet`].
    pub fn run<R: Rng + ?Sized>(
        self,
        y: ArrayView1<'_, f64>,
        rng: &mut R,
        pool: Option<&rayon::ThreadPool>,
    ) -> PythiaResult<LedgerSet> {
        let folds = split(y, &self.config, rng)?;
        let mut ledgers = Vec::with_capacity(folds.len());
        for (fold_no, fold) in folds.iter().enumerate() {
            let scenario = (self.scenario_factory)(fold)?;
            let mut al =
                ActiveLearningLoop::new(scenario, (self.stop_factory)(), self.config.clone());
            ledgers.push(al.run(fold_no, pool)?);
        }
        info!(
            method = %self.method_name,
            folds = ledgers.len(),
            "cross-validation experiment finished"
        );
        Ok(LedgerSet::new(self.method_name, ledgers))
    }
}
