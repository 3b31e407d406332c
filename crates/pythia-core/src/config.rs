//! Experiment configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Knobs shared by the scenario, the loop, and the experiment drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Samples requested from the query strategy per iteration.
    pub batch_size: usize,
    /// Whether the ledger prints a progress line on every append.
    pub verbose: bool,
    /// How many recorded iterations trigger one progress line.
    pub print_interval: usize,
    /// Fraction of the pool held out for testing (split helper).
    pub test_ratio: f64,
    /// Fraction of the training pool labeled before the first query.
    pub initial_label_rate: f64,
    /// Number of folds produced by the split helper.
    pub fold_count: usize,
    /// Whether every fold must contain at least one sample of each class.
    pub require_all_classes: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            batch_size: constants::DEFAULT_BATCH_SIZE,
            verbose: true,
            print_interval: constants::DEFAULT_PRINT_INTERVAL,
            test_ratio: constants::DEFAULT_TEST_RATIO,
            initial_label_rate: constants::DEFAULT_INITIAL_LABEL_RATE,
            fold_count: constants::DEFAULT_FOLD_COUNT,
            require_all_classes: true,
        }
    }
}
