//! # pythia-core
//!
//! Foundation crate for the pythia active-learning orchestrator.
//! Defines the errors, config, collaborator traits, index collections,
//! the iteration ledger, and the stop policies.
//! Every other crate in the workspace depends on this.

pub mod collections;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod stop;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use collections::{IndexSet, LabelIndexSet, LabelRef};
pub use config::ExperimentConfig;
pub use errors::{PythiaError, PythiaResult};
pub use ledger::{Ledger, LedgerEntry, LedgerSet, MetricValue, PerfValue, Workspace};
pub use stop::StopPolicy;
pub use traits::{IMetric, IModel, IOracle, IQueryStrategy, SelectionContext};
