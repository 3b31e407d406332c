//! # pythia-experiment
//!
//! The pool-based scenario, the active-learning loop, experiment drivers,
//! data-split helpers, a simulated oracle, and baseline metrics.

pub mod al_loop;
pub mod experiment;
pub mod metrics;
pub mod oracle;
pub mod scenario;
pub mod split;

pub use al_loop::{ActiveLearningLoop, LoopState};
pub use experiment::{CrossValidationExperiment, FoldScenarioFactory, HoldOutExperiment};
pub use metrics::{Accuracy, MeanSquaredError, ZeroOneLoss};
pub use oracle::SimulatedOracle;
pub use scenario::{PoolScenario, PoolScenarioBuilder};
pub use split::{split, FoldSplit};
