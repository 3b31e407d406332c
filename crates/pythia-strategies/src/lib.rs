//! # pythia-strategies
//!
//! Concrete query strategies over the `pythia-core` contracts.
//! Every strategy short-circuits when the unlabeled pool is not larger
//! than the batch size, returning the whole pool.

pub mod committee;
pub mod error_reduction;
pub mod random;
pub mod ranking;
pub mod uncertainty;

pub use committee::{Disagreement, ModelFactory, QueryByCommittee};
pub use error_reduction::ExpectedErrorReduction;
pub use random::RandomSampling;
pub use uncertainty::{Measure, UncertaintySampling};
