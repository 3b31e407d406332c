//! The active-learning loop driving one scenario to its stop condition.

use tracing::info;

use pythia_core::{
    ExperimentConfig, IModel, Ledger, LedgerEntry, PythiaResult, StopPolicy,
};

use crate::scenario::PoolScenario;

/// Lifecycle of one loop run; `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Iterating,
    Stopped,
}

/// Runs train, select, label, update, record in strict sequence each
/// iteration until the stop policy fires or the unlabeled pool empties.
///
/// A mid-iteration error propagates to the caller without appending a
/// partial entry; the ledger keeps its last committed state.
pub struct ActiveLearningLoop {
    scenario: PoolScenario,
    stop: StopPolicy,
    config: ExperimentConfig,
    state: LoopState,
}

impl ActiveLearningLoop {
    pub fn new(scenario: PoolScenario, stop: StopPolicy, config: ExperimentConfig) -> Self {
        Self {
            scenario,
            stop,
            config,
            state: LoopState::Init,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The model fitted during the run, for inspection after [`Self::run`].
    pub fn model(&self) -> &dyn IModel {
        self.scenario.model()
    }

    pub fn scenario(&self) -> &PoolScenario {
        &self.scenario
    }

    /// Drive the loop to completion and return the full iteration ledger.
    ///
    /// `round` tags the ledger (the fold number under cross-validation).
    /// The optional worker pool is threaded into the training and
    /// selection phases only; the loop itself stays single-threaded with
    /// one blocking call per phase.
    pub fn run(
        &mut self,
        round: usize,
        pool: Option<&rayon::ThreadPool>,
    ) -> PythiaResult<Ledger> {
        let mut ledger = self.scenario.init_iteration(round, &self.config)?;
        let metric_names = ledger.metric_names().to_vec();
        self.state = LoopState::Iterating;
        let mut first_iteration = true;
        while !self.stop.is_stop() && self.scenario.remaining_unlabeled_instances() {
            let (_predictions, perf) = self.scenario.execute_labeled_training(pool)?;
            if first_iteration {
                ledger.set_initial_point(perf.clone())?;
                first_iteration = false;
            }
            let selected = self.scenario.select_instances(pool)?;
            let (labels, cost) = self.scenario.label_instances(&selected)?;
            self.scenario.update_labeled_data(&selected);
            let entry =
                LedgerEntry::new(selected, &metric_names, perf, Some(labels), Some(cost))?;
            ledger.add_entry(entry)?;
            self.stop.update_information(&ledger)?;
        }
        self.state = LoopState::Stopped;
        info!(
            round,
            iterations = ledger.len(),
            queried = ledger.queried_sample_count(),
            cost = ledger.total_cost(),
            "active learning loop finished"
        );
        Ok(ledger)
    }
}
