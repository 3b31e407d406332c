//! Collaborator contracts consumed by the orchestration core.
//!
//! The core owns no training algorithm, uncertainty formula, or labeling
//! logic — models, query strategies, oracles, and metrics plug in through
//! these traits.

mod metric;
mod model;
mod oracle;
mod strategy;

pub use metric::IMetric;
pub use model::IModel;
pub use oracle::IOracle;
pub use strategy::{IQueryStrategy, SelectionContext};
